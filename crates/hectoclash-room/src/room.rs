//! A single duel room. Owned by the hub task; nothing else touches it.

use std::collections::HashMap;

use hectoclash_engine::{DigitSequence, Puzzle};
use hectoclash_protocol::{PlayerId, RoomId};
use hectoclash_transport::ConnectionId;

use crate::{Client, RoomState};

/// Players per room.
pub const ROOM_CAPACITY: usize = 2;

/// A snapshot of room metadata for callers outside the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    /// Seated players, sorted.
    pub players: Vec<PlayerId>,
    /// The puzzle's digits while the room is active.
    pub digits: Option<DigitSequence>,
}

#[derive(Debug)]
pub(crate) struct Room {
    id: RoomId,
    clients: HashMap<PlayerId, Client>,
    puzzle: Option<Puzzle>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            clients: HashMap::with_capacity(ROOM_CAPACITY),
            puzzle: None,
        }
    }

    pub(crate) fn state(&self) -> RoomState {
        if self.puzzle.is_some() {
            RoomState::Active
        } else {
            RoomState::Waiting
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.clients.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.clients.len() >= ROOM_CAPACITY
    }

    pub(crate) fn contains(&self, player_id: &PlayerId) -> bool {
        self.clients.contains_key(player_id)
    }

    /// The client seated as `player_id`, if it is on connection `conn_id`.
    pub(crate) fn client_on(&self, player_id: &PlayerId, conn_id: ConnectionId) -> Option<&Client> {
        self.clients
            .get(player_id)
            .filter(|client| client.conn_id == conn_id)
    }

    pub(crate) fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Seats a client. The caller has already checked capacity.
    pub(crate) fn insert(&mut self, client: Client) {
        debug_assert!(!self.is_full());
        self.clients.insert(client.player_id.clone(), client);
    }

    /// Removes `player_id` only if it is seated on `conn_id`.
    pub(crate) fn remove_on(&mut self, player_id: &PlayerId, conn_id: ConnectionId) -> Option<Client> {
        self.client_on(player_id, conn_id)?;
        self.clients.remove(player_id)
    }

    pub(crate) fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    pub(crate) fn set_puzzle(&mut self, puzzle: Puzzle) {
        self.puzzle = Some(puzzle);
    }

    /// Drops the puzzle, putting the room back into [`RoomState::Waiting`].
    pub(crate) fn clear_puzzle(&mut self) {
        self.puzzle = None;
    }

    /// Closes every client's outbound queue and empties the room.
    pub(crate) fn close_all(&mut self) {
        for client in self.clients.values_mut() {
            client.close();
        }
        self.clients.clear();
    }

    pub(crate) fn info(&self) -> RoomInfo {
        let mut players: Vec<PlayerId> = self.clients.keys().cloned().collect();
        players.sort();
        RoomInfo {
            room_id: self.id.clone(),
            state: self.state(),
            players,
            digits: self.puzzle.as_ref().map(|p| p.digits),
        }
    }
}
