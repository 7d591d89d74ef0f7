//! # Hectoclash
//!
//! Real-time two-player Hectoc duels over WebSockets.
//!
//! Players connect to `/api/v1/ws/rooms/{roomId}/join?userId={playerId}`.
//! The second player in a room triggers a shared six-digit puzzle; the
//! first to submit an expression over those digits that makes exactly 100
//! wins, and both players' ratings are updated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hectoclash::HectoclashServer;
//!
//! # async fn run() -> Result<(), hectoclash::HectoclashError> {
//! let server = HectoclashServer::builder()
//!     .bind("127.0.0.1:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod persistence;
pub mod rating;
mod server;
mod store;

pub use config::ServerConfig;
pub use error::HectoclashError;
pub use handler::{TargetError, parse_target};
pub use persistence::{Persistence, spawn_persistence};
pub use server::{HectoclashServer, HectoclashServerBuilder};
pub use store::{GameId, GameRecord, GameStore, MemoryStore, StoreError, SubmissionRecord};
