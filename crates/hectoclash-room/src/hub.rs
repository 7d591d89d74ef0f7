//! The hub actor: one Tokio task that owns every room.
//!
//! Connection tasks never touch room state. They hold a cloneable
//! [`HubHandle`] and push events into a single bounded intake queue. The
//! hub applies events one at a time in the order they were queued, so room
//! membership, puzzle assignment and game completion never race, and a
//! submission followed by a leave from the same connection is seen in that
//! order. Outbound delivery uses a bounded wait per client, which keeps one
//! stalled socket from holding up every other room.

use std::collections::HashMap;
use std::sync::Arc;

use hectoclash_engine::{FALLBACKS, Puzzle, PuzzleSource, verify};
use hectoclash_protocol::{Message, MessageBody, PlayerId, RoomId};
use hectoclash_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::room::Room;
use crate::{Client, GameHooks, HubConfig, RoomError, RoomInfo, Submission};

// Texts of the notifications the hub sends.
pub const ROOM_CREATED: &str = "Room created successfully";
pub const JOIN_SUCCESS: &str = "Joined the room successfully";
pub const ROOM_FULL: &str = "Room is full";
pub const LEAVE_SUCCESS: &str = "Left the room successfully";
pub const OPPONENT_LEFT: &str = "Your opponent left the room";
pub const INVALID_FORMAT: &str =
    "Invalid submission format. Please ensure your submission matches the Hectoc sequence.";
pub const CORRECT_SUBMISSION: &str = "Congratulations! You have submitted the correct answer.";
pub const GAME_OVER: &str = "Game over! Your opponent has submitted the correct answer.";
pub const INCORRECT_SUBMISSION: &str = "Incorrect submission. Try again.";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

enum HubEvent {
    Join(Client),
    Leave {
        room_id: RoomId,
        player_id: PlayerId,
        conn_id: ConnectionId,
    },
    Broadcast {
        conn_id: ConnectionId,
        msg: Message,
    },
    Submit {
        room_id: RoomId,
        player_id: PlayerId,
        conn_id: ConnectionId,
        expression: String,
    },
    Info {
        room_id: RoomId,
        reply: oneshot::Sender<Option<RoomInfo>>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

// ---------------------------------------------------------------------------
// HubHandle
// ---------------------------------------------------------------------------

/// Handle to the running hub. Cheap to clone; one per connection task.
///
/// Every method waits for a free slot in the intake queue. The hub stops
/// once every handle has been dropped.
#[derive(Clone)]
pub struct HubHandle {
    events: mpsc::Sender<HubEvent>,
}

impl HubHandle {
    async fn send(&self, event: HubEvent) -> Result<(), RoomError> {
        self.events
            .send(event)
            .await
            .map_err(|_| RoomError::HubUnavailable)
    }

    /// Hands a new client to the hub. The hub replies on the client's own
    /// outbound queue (`room_created`, `join_success`, or `room_full`).
    pub async fn join(&self, client: Client) -> Result<(), RoomError> {
        self.send(HubEvent::Join(client)).await
    }

    /// Removes `player_id` from `room_id` if it is still seated on
    /// `conn_id`. Anything else is ignored by the hub.
    pub async fn leave(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        conn_id: ConnectionId,
    ) -> Result<(), RoomError> {
        self.send(HubEvent::Leave {
            room_id,
            player_id,
            conn_id,
        })
        .await
    }

    /// Relays `msg` to every client in `msg.room_id`.
    ///
    /// The hub drops the message unless `msg.sender_id` is seated in that
    /// room on `conn_id`.
    pub async fn broadcast(&self, conn_id: ConnectionId, msg: Message) -> Result<(), RoomError> {
        self.send(HubEvent::Broadcast { conn_id, msg }).await
    }

    /// Queues an answer for checking.
    pub async fn submit(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        conn_id: ConnectionId,
        expression: String,
    ) -> Result<(), RoomError> {
        self.send(HubEvent::Submit {
            room_id,
            player_id,
            conn_id,
            expression,
        })
        .await
    }

    /// Requests a snapshot of one room. `None` if it doesn't exist.
    pub async fn room_info(&self, room_id: RoomId) -> Result<Option<RoomInfo>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubEvent::Info {
            room_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::HubUnavailable)
    }

    /// Number of live rooms. Answered after every event queued before it.
    pub async fn room_count(&self) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubEvent::Count { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::HubUnavailable)
    }
}

// ---------------------------------------------------------------------------
// Hub actor
// ---------------------------------------------------------------------------

/// The internal hub state. Runs inside a Tokio task.
struct Hub<H: GameHooks> {
    config: HubConfig,
    rooms: HashMap<RoomId, Room>,
    puzzles: Arc<dyn PuzzleSource>,
    hooks: H,
    events: mpsc::Receiver<HubEvent>,
}

impl<H: GameHooks> Hub<H> {
    /// Runs the actor loop until every [`HubHandle`] is gone.
    async fn run(mut self) {
        tracing::info!("room hub started");

        while let Some(event) = self.events.recv().await {
            self.handle_event(event).await;
        }

        tracing::info!(rooms = self.rooms.len(), "room hub stopped");
    }

    async fn handle_event(&mut self, event: HubEvent) {
        match event {
            HubEvent::Join(client) => self.handle_join(client).await,
            HubEvent::Leave {
                room_id,
                player_id,
                conn_id,
            } => self.handle_leave(room_id, player_id, conn_id).await,
            HubEvent::Broadcast { conn_id, msg } => self.handle_broadcast(conn_id, msg).await,
            HubEvent::Submit {
                room_id,
                player_id,
                conn_id,
                expression,
            } => {
                self.handle_submit(room_id, player_id, conn_id, expression)
                    .await
            }
            HubEvent::Info { room_id, reply } => {
                let _ = reply.send(self.rooms.get(&room_id).map(Room::info));
            }
            HubEvent::Count { reply } => {
                let _ = reply.send(self.rooms.len());
            }
        }
    }

    // -- Join ---------------------------------------------------------------

    async fn handle_join(&mut self, mut client: Client) {
        let timeout = self.config.delivery_timeout;
        let room_id = client.room_id.clone();
        let player_id = client.player_id.clone();

        let Some(room) = self.rooms.get_mut(&room_id) else {
            client
                .deliver(notice(&room_id, MessageBody::RoomCreated(ROOM_CREATED.into())), timeout)
                .await;
            let mut room = Room::new(room_id.clone());
            room.insert(client);
            self.rooms.insert(room_id.clone(), room);
            tracing::info!(%room_id, %player_id, "room created");
            return;
        };

        if room.contains(&player_id) {
            let reason = RoomError::AlreadyInRoom(player_id.clone(), room_id.clone());
            tracing::info!(%room_id, %player_id, "duplicate player rejected");
            client
                .deliver(notice(&room_id, MessageBody::Error(reason.to_string())), timeout)
                .await;
            client.close();
            return;
        }

        if room.is_full() {
            tracing::info!(%room_id, %player_id, "room full, join rejected");
            client
                .deliver(notice(&room_id, MessageBody::RoomFull(ROOM_FULL.into())), timeout)
                .await;
            client.close();
            return;
        }

        client
            .deliver(notice(&room_id, MessageBody::JoinSuccess(JOIN_SUCCESS.into())), timeout)
            .await;
        room.insert(client);
        tracing::info!(%room_id, %player_id, players = room.len(), "player joined");

        if room.is_full() {
            self.start_game(room_id).await;
        }
    }

    /// Draws a puzzle for a room that just reached two players and sends
    /// it to both.
    async fn start_game(&mut self, room_id: RoomId) {
        let puzzle = self.next_puzzle().await;
        let timeout = self.config.delivery_timeout;

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        for client in room.clients() {
            let msg = notice(&room_id, MessageBody::PuzzleAssign(puzzle.digits))
                .with_sender(client.player_id.clone());
            client.deliver(msg, timeout).await;
        }

        tracing::info!(
            %room_id,
            digits = %puzzle.digits,
            solutions = puzzle.solutions.len(),
            "puzzle assigned"
        );
        self.hooks.on_puzzle_created(&room_id, &puzzle);
        room.set_puzzle(puzzle);
    }

    /// Runs the puzzle source on the blocking pool and waits for it.
    ///
    /// The hub loop is suspended meanwhile, so a slow draw (a full solve,
    /// or several when unsolvable digits are redrawn) delays events for
    /// every room, not just the one being started.
    async fn next_puzzle(&self) -> Puzzle {
        let source = Arc::clone(&self.puzzles);
        match tokio::task::spawn_blocking(move || source.next_puzzle()).await {
            Ok(puzzle) => puzzle,
            Err(e) => {
                tracing::error!(error = %e, "puzzle source failed, using fallback digits");
                Puzzle::with_solutions(FALLBACKS[0], Vec::new())
            }
        }
    }

    // -- Leave --------------------------------------------------------------

    async fn handle_leave(&mut self, room_id: RoomId, player_id: PlayerId, conn_id: ConnectionId) {
        let timeout = self.config.delivery_timeout;

        let Some(room) = self.rooms.get_mut(&room_id) else {
            tracing::debug!(%room_id, %player_id, "leave for unknown room ignored");
            return;
        };
        let Some(mut client) = room.remove_on(&player_id, conn_id) else {
            tracing::debug!(%room_id, %player_id, %conn_id, "leave for unseated connection ignored");
            return;
        };

        client
            .deliver(notice(&room_id, MessageBody::LeaveSuccess(LEAVE_SUCCESS.into())), timeout)
            .await;
        client.close();
        tracing::info!(%room_id, %player_id, players = room.len(), "player left");

        if room.is_empty() {
            self.rooms.remove(&room_id);
            tracing::info!(%room_id, "room removed, last player left");
            self.hooks.on_room_empty(&room_id);
            return;
        }

        room.clear_puzzle();
        for other in room.clients() {
            other
                .deliver(notice(&room_id, MessageBody::OpponentLeft(OPPONENT_LEFT.into())), timeout)
                .await;
        }
    }

    // -- Broadcast ----------------------------------------------------------

    async fn handle_broadcast(&mut self, conn_id: ConnectionId, msg: Message) {
        let timeout = self.config.delivery_timeout;
        let Some(room) = self.rooms.get(&msg.room_id) else {
            tracing::debug!(room_id = %msg.room_id, kind = %msg.kind(), "broadcast to unknown room dropped");
            return;
        };
        let seated = msg
            .sender_id
            .as_ref()
            .is_some_and(|sender| room.client_on(sender, conn_id).is_some());
        if !seated {
            tracing::debug!(
                room_id = %msg.room_id,
                sender = ?msg.sender_id,
                %conn_id,
                kind = %msg.kind(),
                "broadcast from non-member dropped"
            );
            return;
        }
        for client in room.clients() {
            client.deliver(msg.clone(), timeout).await;
        }
    }

    // -- Submit -------------------------------------------------------------

    async fn handle_submit(
        &mut self,
        room_id: RoomId,
        player_id: PlayerId,
        conn_id: ConnectionId,
        expression: String,
    ) {
        let timeout = self.config.delivery_timeout;

        let Some(room) = self.rooms.get(&room_id) else {
            tracing::debug!(%room_id, %player_id, "submission for unknown room dropped");
            return;
        };
        let Some(submitter) = room.client_on(&player_id, conn_id) else {
            tracing::debug!(%room_id, %player_id, "submission from non-member dropped");
            return;
        };
        let Some(puzzle) = room.puzzle() else {
            let reason = RoomError::PuzzleNotAssigned.to_string();
            submitter
                .deliver(notice(&room_id, MessageBody::Error(reason)), timeout)
                .await;
            return;
        };

        if !puzzle.digits.matches_submission(&expression) {
            tracing::debug!(%room_id, %player_id, %expression, "submission does not use the puzzle digits");
            submitter
                .deliver(notice(&room_id, MessageBody::WrongSubmission(INVALID_FORMAT.into())), timeout)
                .await;
            return;
        }

        let correct = match verify(&expression) {
            Ok(correct) => correct,
            Err(e) => {
                tracing::debug!(%room_id, %player_id, %expression, error = %e, "submission failed to evaluate");
                let text = format!("Error verifying submission: {e}");
                submitter
                    .deliver(notice(&room_id, MessageBody::Error(text)), timeout)
                    .await;
                return;
            }
        };

        let submission = Submission {
            player_id: player_id.clone(),
            expression,
            correct,
        };
        self.hooks.on_submission(&room_id, &submission);

        if !correct {
            tracing::debug!(%room_id, %player_id, expression = %submission.expression, "incorrect submission");
            submitter
                .deliver(notice(&room_id, MessageBody::WrongSubmission(INCORRECT_SUBMISSION.into())), timeout)
                .await;
            return;
        }

        self.finish_game(room_id, player_id).await;
    }

    /// Notifies both players, closes their queues, and removes the room.
    async fn finish_game(&mut self, room_id: RoomId, winner: PlayerId) {
        let timeout = self.config.delivery_timeout;
        let Some(mut room) = self.rooms.remove(&room_id) else {
            return;
        };

        let mut loser = None;
        for client in room.clients() {
            let body = if client.player_id == winner {
                MessageBody::CorrectSubmission(CORRECT_SUBMISSION.into())
            } else {
                loser = Some(client.player_id.clone());
                MessageBody::End(GAME_OVER.into())
            };
            client.deliver(notice(&room_id, body), timeout).await;
        }
        room.close_all();

        tracing::info!(%room_id, %winner, ?loser, "game over");
        match loser {
            Some(loser) => self.hooks.on_game_ended(&room_id, &winner, &loser),
            None => tracing::warn!(%room_id, %winner, "game ended without an opponent"),
        }
    }
}

/// A hub notification for `room_id`.
fn notice(room_id: &RoomId, body: MessageBody) -> Message {
    Message::new(body, room_id.clone())
}

/// Spawns the hub task and returns a handle to it.
pub fn spawn_hub<H: GameHooks>(
    config: HubConfig,
    puzzles: Arc<dyn PuzzleSource>,
    hooks: H,
) -> HubHandle {
    let (events_tx, events_rx) = mpsc::channel(config.intake_capacity.max(1));

    let hub = Hub {
        config,
        rooms: HashMap::new(),
        puzzles,
        hooks,
        events: events_rx,
    };
    tokio::spawn(hub.run());

    HubHandle { events: events_tx }
}
