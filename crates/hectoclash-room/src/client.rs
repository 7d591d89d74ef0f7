//! A connected player as the hub sees it.

use std::time::Duration;

use hectoclash_protocol::{Message, PlayerId, RoomId};
use hectoclash_transport::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

/// One player on one connection, waiting to be seated in a room.
///
/// The hub owns the sending half of the client's outbound queue; the
/// connection's writer task owns the receiving half and drains it onto the
/// socket. Dropping or [closing](Self::close) the sender is how the hub
/// tells the writer the client is done.
#[derive(Debug)]
pub struct Client {
    pub player_id: PlayerId,
    pub conn_id: ConnectionId,
    pub room_id: RoomId,
    outbound: Option<mpsc::Sender<Message>>,
}

impl Client {
    /// Creates a client with a bounded outbound queue of `capacity`
    /// messages and returns the receiving half for the writer task.
    pub fn new(
        player_id: PlayerId,
        conn_id: ConnectionId,
        room_id: RoomId,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let client = Self {
            player_id,
            conn_id,
            room_id,
            outbound: Some(tx),
        };
        (client, rx)
    }

    /// Closes the outbound queue. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        self.outbound.take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_none()
    }

    /// Queues `msg` for this client, waiting at most `timeout` for room.
    ///
    /// A full queue past the timeout drops the message with a warning. A
    /// closed queue (writer gone, or already closed by the hub) is skipped.
    pub(crate) async fn deliver(&self, msg: Message, timeout: Duration) {
        let Some(tx) = &self.outbound else {
            return;
        };

        let kind = msg.kind();
        match tx.send_timeout(msg, timeout).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                tracing::warn!(
                    room_id = %self.room_id,
                    player_id = %self.player_id,
                    conn_id = %self.conn_id,
                    %kind,
                    "outbound queue full, message dropped"
                );
            }
            Err(SendTimeoutError::Closed(_)) => {
                tracing::debug!(
                    player_id = %self.player_id,
                    conn_id = %self.conn_id,
                    %kind,
                    "outbound queue closed, message skipped"
                );
            }
        }
    }
}
