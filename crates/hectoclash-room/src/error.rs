//! Error types for the room layer.
//!
//! The `Display` text of the rejection variants is sent to the client
//! verbatim inside an `error` frame.

use hectoclash_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The hub task has stopped; its intake queues are closed.
    #[error("room hub is unavailable")]
    HubUnavailable,

    /// A second connection tried to join with a player id already
    /// seated in the room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// A submission arrived before the second player joined.
    #[error("puzzle not assigned yet")]
    PuzzleNotAssigned,
}
