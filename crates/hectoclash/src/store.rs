//! The game store: where rooms map to games and results are kept.
//!
//! The server never talks to a database directly. It holds something that
//! implements [`GameStore`], and the connection handler and persistence
//! task call it. [`MemoryStore`] is the in-process implementation the
//! binary runs with.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use hectoclash_engine::Puzzle;
use hectoclash_protocol::{PlayerId, RoomId};
use hectoclash_room::Submission;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::rating::DEFAULT_RATING;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identifier of a game record, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game-{}", self.0)
    }
}

/// A checked submission tied to the game it was made in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub expression: String,
    pub correct: bool,
}

impl SubmissionRecord {
    pub fn new(game_id: GameId, submission: Submission) -> Self {
        Self {
            game_id,
            player_id: submission.player_id,
            expression: submission.expression,
            correct: submission.correct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No game is open for this room.
    #[error("no game for room {0}")]
    RoomNotFound(RoomId),

    /// The game id doesn't refer to a stored game.
    #[error("{0} not found")]
    GameNotFound(GameId),

    /// The backing store couldn't be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True for lookups that found nothing, as opposed to store failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RoomNotFound(_) | Self::GameNotFound(_))
    }
}

// ---------------------------------------------------------------------------
// GameStore
// ---------------------------------------------------------------------------

/// Storage for games, players, puzzles, submissions and ratings.
///
/// Methods return `Send` futures so a generic store can be driven from
/// spawned tasks.
pub trait GameStore: Send + Sync + 'static {
    /// The game currently open for `room_id`.
    fn resolve_game(
        &self,
        room_id: &RoomId,
    ) -> impl Future<Output = Result<GameId, StoreError>> + Send;

    /// Records that `player_id` joined `game_id`.
    fn register_player(
        &self,
        game_id: GameId,
        player_id: &PlayerId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Forgets the room→game mapping for `room_id`. The game record stays.
    fn evict_room(&self, room_id: &RoomId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn save_puzzle(
        &self,
        game_id: GameId,
        puzzle: &Puzzle,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn record_submission(
        &self,
        record: SubmissionRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Current rating of `player_id`, [`DEFAULT_RATING`] if unrated.
    fn rating(&self, player_id: &PlayerId) -> impl Future<Output = Result<i32, StoreError>> + Send;

    /// Stores each player's rating after `game_id`.
    fn record_ratings(
        &self,
        game_id: GameId,
        ratings: [(PlayerId, i32); 2],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Everything stored about one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub room_id: RoomId,
    pub players: Vec<PlayerId>,
    pub puzzle: Option<Puzzle>,
    pub submissions: Vec<SubmissionRecord>,
    /// Ratings after the game, once it has a result.
    pub ratings: Vec<(PlayerId, i32)>,
}

impl GameRecord {
    fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            players: Vec::new(),
            puzzle: None,
            submissions: Vec::new(),
            ratings: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    next_game: u64,
    rooms: HashMap<RoomId, GameId>,
    games: HashMap<GameId, GameRecord>,
    ratings: HashMap<PlayerId, i32>,
}

impl Tables {
    fn open(&mut self, room_id: &RoomId) -> GameId {
        self.next_game += 1;
        let game_id = GameId(self.next_game);
        self.games.insert(game_id, GameRecord::new(room_id.clone()));
        self.rooms.insert(room_id.clone(), game_id);
        game_id
    }

    fn game_mut(&mut self, game_id: GameId) -> Result<&mut GameRecord, StoreError> {
        self.games
            .get_mut(&game_id)
            .ok_or(StoreError::GameNotFound(game_id))
    }
}

/// A [`GameStore`] kept in memory.
///
/// With `auto_open_games` set, resolving a room that has no game opens
/// one. Otherwise only rooms passed to [`open_game`](Self::open_game)
/// resolve.
#[derive(Debug)]
pub struct MemoryStore {
    auto_open_games: bool,
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new(auto_open_games: bool) -> Self {
        Self {
            auto_open_games,
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Opens a fresh game for `room_id`, replacing any current mapping.
    pub async fn open_game(&self, room_id: &RoomId) -> GameId {
        let game_id = self.tables.lock().await.open(room_id);
        tracing::debug!(%room_id, %game_id, "game opened");
        game_id
    }

    /// The game currently mapped to `room_id`, without opening one.
    pub async fn game_for(&self, room_id: &RoomId) -> Option<GameId> {
        self.tables.lock().await.rooms.get(room_id).copied()
    }

    /// A copy of the stored game.
    pub async fn game(&self, game_id: GameId) -> Option<GameRecord> {
        self.tables.lock().await.games.get(&game_id).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GameStore for MemoryStore {
    async fn resolve_game(&self, room_id: &RoomId) -> Result<GameId, StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(game_id) = tables.rooms.get(room_id) {
            return Ok(*game_id);
        }
        if !self.auto_open_games {
            return Err(StoreError::RoomNotFound(room_id.clone()));
        }
        let game_id = tables.open(room_id);
        tracing::debug!(%room_id, %game_id, "game opened on first join");
        Ok(game_id)
    }

    async fn register_player(&self, game_id: GameId, player_id: &PlayerId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let game = tables.game_mut(game_id)?;
        if !game.players.contains(player_id) {
            game.players.push(player_id.clone());
        }
        Ok(())
    }

    async fn evict_room(&self, room_id: &RoomId) -> Result<(), StoreError> {
        self.tables.lock().await.rooms.remove(room_id);
        Ok(())
    }

    async fn save_puzzle(&self, game_id: GameId, puzzle: &Puzzle) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.game_mut(game_id)?.puzzle = Some(puzzle.clone());
        Ok(())
    }

    async fn record_submission(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.game_mut(record.game_id)?.submissions.push(record);
        Ok(())
    }

    async fn rating(&self, player_id: &PlayerId) -> Result<i32, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ratings
            .get(player_id)
            .copied()
            .unwrap_or(DEFAULT_RATING))
    }

    async fn record_ratings(&self, game_id: GameId, ratings: [(PlayerId, i32); 2]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.game_mut(game_id)?.ratings = ratings.to_vec();
        for (player_id, rating) in ratings {
            tables.ratings.insert(player_id, rating);
        }
        Ok(())
    }
}
