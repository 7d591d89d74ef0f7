//! Room hub for Hectoclash.
//!
//! A single actor task owns every room and applies joins, leaves,
//! broadcasts and submissions in arrival order.
//!
//! # Key types
//!
//! - [`spawn_hub`] / [`HubHandle`]: start the hub and talk to it
//! - [`Client`]: a player on a connection, with its outbound queue
//! - [`GameHooks`]: callbacks for puzzles, submissions, and results
//! - [`RoomInfo`] / [`RoomState`]: read-only room snapshots
//! - [`HubConfig`]: queue sizes and delivery timeout

mod client;
mod config;
mod error;
mod hooks;
mod hub;
mod room;

pub use client::Client;
pub use config::{HubConfig, RoomState};
pub use error::RoomError;
pub use hooks::{GameHooks, Submission};
pub use hub::{
    CORRECT_SUBMISSION, GAME_OVER, HubHandle, INCORRECT_SUBMISSION, INVALID_FORMAT, JOIN_SUCCESS,
    LEAVE_SUCCESS, OPPONENT_LEFT, ROOM_CREATED, ROOM_FULL, spawn_hub,
};
pub use room::{ROOM_CAPACITY, RoomInfo};
