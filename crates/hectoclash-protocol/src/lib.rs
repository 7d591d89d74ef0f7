//! Wire protocol for Hectoclash.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`Message`], [`MessageBody`], [`MessageType`], [`RoomId`],
//!   [`PlayerId`]): the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! It knows nothing about connections or rooms.
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Room hub
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Message, MessageBody, MessageType, PlayerId, RoomId};
