//! Persistence bridge: hub callbacks in, store calls out.
//!
//! The hub fires [`GameHooks`] from inside its own task and can't wait on
//! storage. [`Persistence`] forwards each callback into an unbounded
//! queue. A single task drains it in order and drives the [`GameStore`].
//! Store failures are logged and dropped; they never reach the hub.

use std::sync::Arc;

use hectoclash_engine::Puzzle;
use hectoclash_protocol::{PlayerId, RoomId};
use hectoclash_room::{GameHooks, Submission};
use tokio::sync::{mpsc, oneshot};

use crate::rating::new_ratings;
use crate::store::{GameStore, StoreError, SubmissionRecord};

enum StoreEvent {
    RoomEmpty(RoomId),
    PuzzleCreated(RoomId, Puzzle),
    Submitted(RoomId, Submission),
    GameEnded {
        room_id: RoomId,
        winner: PlayerId,
        loser: PlayerId,
    },
    Flush(oneshot::Sender<()>),
}

/// [`GameHooks`] implementation that hands events to the persistence task.
#[derive(Clone)]
pub struct Persistence {
    events: mpsc::UnboundedSender<StoreEvent>,
}

impl Persistence {
    fn push(&self, event: StoreEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("persistence task is gone, event dropped");
        }
    }

    /// Waits until every event queued before this call has been applied.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.push(StoreEvent::Flush(done_tx));
        let _ = done_rx.await;
    }
}

impl GameHooks for Persistence {
    fn on_room_empty(&self, room_id: &RoomId) {
        self.push(StoreEvent::RoomEmpty(room_id.clone()));
    }

    fn on_puzzle_created(&self, room_id: &RoomId, puzzle: &Puzzle) {
        self.push(StoreEvent::PuzzleCreated(room_id.clone(), puzzle.clone()));
    }

    fn on_submission(&self, room_id: &RoomId, submission: &Submission) {
        self.push(StoreEvent::Submitted(room_id.clone(), submission.clone()));
    }

    fn on_game_ended(&self, room_id: &RoomId, winner: &PlayerId, loser: &PlayerId) {
        self.push(StoreEvent::GameEnded {
            room_id: room_id.clone(),
            winner: winner.clone(),
            loser: loser.clone(),
        });
    }
}

/// Spawns the persistence task for `store`.
///
/// The task stops once every [`Persistence`] clone has been dropped.
pub fn spawn_persistence<S: GameStore>(store: Arc<S>) -> Persistence {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            apply(store.as_ref(), event).await;
        }
        tracing::debug!("persistence task stopped");
    });

    Persistence { events: events_tx }
}

async fn apply<S: GameStore>(store: &S, event: StoreEvent) {
    match event {
        StoreEvent::RoomEmpty(room_id) => {
            if let Err(e) = store.evict_room(&room_id).await {
                tracing::warn!(%room_id, error = %e, "failed to evict empty room");
            }
        }
        StoreEvent::PuzzleCreated(room_id, puzzle) => {
            if let Err(e) = save_puzzle(store, &room_id, &puzzle).await {
                tracing::warn!(%room_id, digits = %puzzle.digits, error = %e, "failed to save puzzle");
            }
        }
        StoreEvent::Submitted(room_id, submission) => {
            let player_id = submission.player_id.clone();
            if let Err(e) = record_submission(store, &room_id, submission).await {
                tracing::warn!(%room_id, %player_id, error = %e, "failed to record submission");
            }
        }
        StoreEvent::GameEnded {
            room_id,
            winner,
            loser,
        } => {
            if let Err(e) = record_result(store, &room_id, &winner, &loser).await {
                tracing::warn!(%room_id, %winner, %loser, error = %e, "failed to record ratings");
            }
            // The next join on this room id starts a new game.
            if let Err(e) = store.evict_room(&room_id).await {
                tracing::warn!(%room_id, error = %e, "failed to evict finished room");
            }
        }
        StoreEvent::Flush(done) => {
            let _ = done.send(());
        }
    }
}

async fn save_puzzle<S: GameStore>(store: &S, room_id: &RoomId, puzzle: &Puzzle) -> Result<(), StoreError> {
    let game_id = store.resolve_game(room_id).await?;
    store.save_puzzle(game_id, puzzle).await
}

async fn record_submission<S: GameStore>(
    store: &S,
    room_id: &RoomId,
    submission: Submission,
) -> Result<(), StoreError> {
    let game_id = store.resolve_game(room_id).await?;
    store
        .record_submission(SubmissionRecord::new(game_id, submission))
        .await
}

async fn record_result<S: GameStore>(
    store: &S,
    room_id: &RoomId,
    winner: &PlayerId,
    loser: &PlayerId,
) -> Result<(), StoreError> {
    let game_id = store.resolve_game(room_id).await?;
    let (winner_after, loser_after) =
        new_ratings(store.rating(winner).await?, store.rating(loser).await?);

    tracing::info!(
        %room_id,
        %game_id,
        %winner,
        winner_rating = winner_after,
        %loser,
        loser_rating = loser_after,
        "ratings updated"
    );
    store
        .record_ratings(
            game_id,
            [(winner.clone(), winner_after), (loser.clone(), loser_after)],
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::DEFAULT_RATING;
    use crate::store::MemoryStore;

    fn room(id: &str) -> RoomId {
        RoomId::from(id)
    }

    fn puzzle() -> Puzzle {
        Puzzle::with_solutions("119999".parse().unwrap(), vec!["1+1*9*9+9+9".into()])
    }

    #[tokio::test]
    async fn test_puzzle_saved_against_resolved_game() {
        let store = Arc::new(MemoryStore::default());
        let hooks = spawn_persistence(Arc::clone(&store));

        hooks.on_puzzle_created(&room("r1"), &puzzle());
        hooks.flush().await;

        let game_id = store.game_for(&room("r1")).await.unwrap();
        assert_eq!(store.game(game_id).await.unwrap().puzzle, Some(puzzle()));
    }

    #[tokio::test]
    async fn test_submission_recorded() {
        let store = Arc::new(MemoryStore::default());
        let hooks = spawn_persistence(Arc::clone(&store));

        let submission = Submission {
            player_id: PlayerId::from("alice"),
            expression: "1+1+9+9+9+9".into(),
            correct: false,
        };
        hooks.on_submission(&room("r1"), &submission);
        hooks.flush().await;

        let game_id = store.game_for(&room("r1")).await.unwrap();
        let game = store.game(game_id).await.unwrap();
        assert_eq!(
            game.submissions,
            vec![SubmissionRecord::new(game_id, submission)]
        );
    }

    #[tokio::test]
    async fn test_game_end_records_ratings_and_evicts_room() {
        let store = Arc::new(MemoryStore::default());
        let hooks = spawn_persistence(Arc::clone(&store));
        let game_id = store.resolve_game(&room("r1")).await.unwrap();
        let (alice, bob) = (PlayerId::from("alice"), PlayerId::from("bob"));

        hooks.on_game_ended(&room("r1"), &alice, &bob);
        hooks.flush().await;

        assert_eq!(store.rating(&alice).await.unwrap(), DEFAULT_RATING + 16);
        assert_eq!(store.rating(&bob).await.unwrap(), DEFAULT_RATING - 16);
        assert_eq!(
            store.game(game_id).await.unwrap().ratings,
            vec![(alice, 416), (bob, 384)]
        );
        assert_eq!(store.game_for(&room("r1")).await, None);
    }

    #[tokio::test]
    async fn test_room_empty_evicts_mapping() {
        let store = Arc::new(MemoryStore::default());
        let hooks = spawn_persistence(Arc::clone(&store));
        store.resolve_game(&room("r1")).await.unwrap();

        hooks.on_room_empty(&room("r1"));
        hooks.flush().await;

        assert_eq!(store.game_for(&room("r1")).await, None);
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        // Without auto-open nothing resolves, so every write fails.
        let store = Arc::new(MemoryStore::new(false));
        let hooks = spawn_persistence(Arc::clone(&store));

        hooks.on_puzzle_created(&room("r1"), &puzzle());
        hooks.on_game_ended(&room("r1"), &PlayerId::from("a"), &PlayerId::from("b"));
        hooks.flush().await;

        assert_eq!(store.rating(&PlayerId::from("a")).await.unwrap(), DEFAULT_RATING);
        assert_eq!(store.game_for(&room("r1")).await, None);
    }
}
