//! Callbacks the hub fires as games progress.

use hectoclash_engine::Puzzle;
use hectoclash_protocol::{PlayerId, RoomId};

/// One checked submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub player_id: PlayerId,
    pub expression: String,
    pub correct: bool,
}

/// Observer of game events, called from inside the hub task.
///
/// Calls are fire-and-forget: they must return quickly and can't fail the
/// hub. Anything slow (storage, network) belongs on another task that the
/// implementation hands the event to. Every method defaults to a no-op.
pub trait GameHooks: Send + Sync + 'static {
    /// The last client left and the room was removed.
    fn on_room_empty(&self, _room_id: &RoomId) {}

    /// A second player joined and the room got its puzzle.
    fn on_puzzle_created(&self, _room_id: &RoomId, _puzzle: &Puzzle) {}

    /// A submission passed the digit check and was verified. Not fired
    /// for format mismatches or expressions that fail to evaluate.
    fn on_submission(&self, _room_id: &RoomId, _submission: &Submission) {}

    /// A correct submission ended the game. Fired once per game, after
    /// the room has been removed.
    fn on_game_ended(&self, _room_id: &RoomId, _winner: &PlayerId, _loser: &PlayerId) {}
}

impl GameHooks for () {}
