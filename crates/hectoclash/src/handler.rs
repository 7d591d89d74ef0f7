//! Per-connection handler: target parsing, join, and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Parse room id and player id from the upgrade request target
//!   2. Resolve the room's game and register the player with the store
//!   3. Hand a `Client` to the hub and spawn the writer task
//!   4. Loop: receive frames → submit, leave, or broadcast through the hub

use std::sync::Arc;

use hectoclash_protocol::{Codec, Message, MessageBody, PlayerId, ProtocolError, RoomId};
use hectoclash_room::Client;
use hectoclash_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use url::Url;

use crate::HectoclashError;
use crate::server::ServerState;
use crate::store::GameStore;

/// Base the request target is resolved against. Only path and query
/// are read.
const TARGET_BASE: &str = "http://localhost";

/// Why an upgrade request target was rejected. The `Display` text is
/// what the client sees in the `error` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("unknown endpoint")]
    UnknownEndpoint,
    #[error("room ID is required")]
    MissingRoomId,
    #[error("user ID is required")]
    MissingUserId,
}

impl From<TargetError> for ProtocolError {
    fn from(e: TargetError) -> Self {
        ProtocolError::InvalidMessage(e.to_string())
    }
}

/// Extracts `(room id, player id)` from
/// `/api/v1/ws/rooms/{roomId}/join?userId={playerId}`.
pub fn parse_target(target: &str) -> Result<(RoomId, PlayerId), TargetError> {
    let url = Url::parse(TARGET_BASE)
        .and_then(|base| base.join(target))
        .map_err(|_| TargetError::UnknownEndpoint)?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or(TargetError::UnknownEndpoint)?
        .collect();

    let room = match segments.as_slice() {
        ["api", "v1", "ws", "rooms", room, "join"] => room.trim(),
        ["api", "v1", "ws", "rooms", "join"] => "",
        _ => return Err(TargetError::UnknownEndpoint),
    };
    if room.is_empty() {
        return Err(TargetError::MissingRoomId);
    }

    let player = url
        .query_pairs()
        .find(|(key, _)| key == "userId")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(TargetError::MissingUserId)?;

    Ok((RoomId::from(room), PlayerId::from(player)))
}

/// How the read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadEnd {
    /// The client sent `leave`. The hub already has the leave queued and
    /// the writer closes the socket once `leave_success` is out.
    Left,
    /// The peer closed the socket cleanly.
    Closed,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, C>>,
) -> Result<(), HectoclashError>
where
    S: GameStore,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(
        %conn_id,
        peer = %conn.peer_addr(),
        target = conn.request_target(),
        "handling new connection"
    );

    // --- Step 1: Target ---
    let (room_id, player_id) = match parse_target(conn.request_target()) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "rejected upgrade target");
            reject(&conn, &state.codec, RoomId::default(), &e.to_string()).await;
            return Err(ProtocolError::from(e).into());
        }
    };

    // --- Step 2: Store ---
    let game_id = match state.store.resolve_game(&room_id).await {
        Ok(game_id) => game_id,
        Err(e) => {
            tracing::info!(%conn_id, %room_id, %player_id, error = %e, "room not found");
            reject(&conn, &state.codec, room_id, "room not found").await;
            return Err(e.into());
        }
    };
    if let Err(e) = state.store.register_player(game_id, &player_id).await {
        tracing::warn!(%room_id, %player_id, %game_id, error = %e, "failed to register player");
    }

    // --- Step 3: Join ---
    let (client, outbound) = Client::new(
        player_id.clone(),
        conn_id,
        room_id.clone(),
        state.outbound_capacity,
    );
    state.hub.join(client).await?;
    tracing::info!(%conn_id, %room_id, %player_id, %game_id, "player connected");

    tokio::spawn(write_loop(
        Arc::clone(&conn),
        outbound,
        state.codec.clone(),
    ));

    // --- Step 4: Read loop ---
    let result = read_loop(&conn, &state, &room_id, &player_id).await;
    if matches!(result, Ok(ReadEnd::Left)) {
        tracing::info!(%conn_id, %room_id, %player_id, "player left");
        return Ok(());
    }

    // A no-op in the hub if the game already ended or the join was refused.
    if let Err(e) = state
        .hub
        .leave(room_id.clone(), player_id.clone(), conn_id)
        .await
    {
        tracing::debug!(%room_id, %player_id, error = %e, "leave on disconnect failed");
    }
    let _ = conn.close().await;
    tracing::info!(%conn_id, %room_id, %player_id, "player disconnected");

    result.map(|_| ())
}

/// Reads frames until the peer goes away or leaves, routing each one to
/// the hub.
async fn read_loop<S, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, C>,
    room_id: &RoomId,
    player_id: &PlayerId,
) -> Result<ReadEnd, HectoclashError>
where
    S: GameStore,
    C: Codec,
{
    let conn_id = conn.id();

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%room_id, %player_id, "connection closed cleanly");
                return Ok(ReadEnd::Closed);
            }
            Err(e) => {
                tracing::debug!(%room_id, %player_id, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let msg: Message = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%room_id, %player_id, error = %e, "failed to decode frame");
                return Err(e.into());
            }
        };
        tracing::debug!(%room_id, %player_id, kind = %msg.kind(), "frame received");

        match msg.body {
            MessageBody::Submit(expression) => {
                state
                    .hub
                    .submit(room_id.clone(), player_id.clone(), conn_id, expression)
                    .await?;
            }
            MessageBody::Leave => {
                state
                    .hub
                    .leave(room_id.clone(), player_id.clone(), conn_id)
                    .await?;
                return Ok(ReadEnd::Left);
            }
            body => {
                let stamped = Message::new(body, room_id.clone()).with_sender(player_id.clone());
                state.hub.broadcast(conn_id, stamped).await?;
            }
        }
    }
}

/// Drains the client's outbound queue onto the socket until the hub
/// closes it, then closes the connection.
async fn write_loop<C: Codec>(
    conn: Arc<WebSocketConnection>,
    mut outbound: mpsc::Receiver<Message>,
    codec: C,
) {
    let conn_id = conn.id();

    while let Some(msg) = outbound.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, kind = %msg.kind(), error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, writer stopping");
            break;
        }
    }

    let _ = conn.close().await;
    tracing::debug!(%conn_id, "writer stopped");
}

/// Sends a single `error` frame and closes the connection.
async fn reject<C: Codec>(conn: &WebSocketConnection, codec: &C, room_id: RoomId, text: &str) {
    let msg = Message::new(MessageBody::Error(text.to_string()), room_id);
    match codec.encode(&msg) {
        Ok(bytes) => {
            if let Err(e) = conn.send(&bytes).await {
                tracing::debug!(conn_id = %conn.id(), error = %e, "failed to send rejection");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode rejection"),
    }
    let _ = conn.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_extracts_ids() {
        let (room, player) = parse_target("/api/v1/ws/rooms/r1/join?userId=alice").unwrap();
        assert_eq!(room, RoomId::from("r1"));
        assert_eq!(player, PlayerId::from("alice"));
    }

    #[test]
    fn test_parse_target_decodes_query() {
        let (_, player) = parse_target("/api/v1/ws/rooms/r1/join?x=1&userId=ann%20lee").unwrap();
        assert_eq!(player, PlayerId::from("ann lee"));
    }

    #[test]
    fn test_parse_target_missing_room() {
        assert_eq!(
            parse_target("/api/v1/ws/rooms//join?userId=alice"),
            Err(TargetError::MissingRoomId)
        );
        assert_eq!(
            parse_target("/api/v1/ws/rooms/join?userId=alice"),
            Err(TargetError::MissingRoomId)
        );
    }

    #[test]
    fn test_parse_target_missing_user() {
        assert_eq!(
            parse_target("/api/v1/ws/rooms/r1/join"),
            Err(TargetError::MissingUserId)
        );
        assert_eq!(
            parse_target("/api/v1/ws/rooms/r1/join?userId="),
            Err(TargetError::MissingUserId)
        );
    }

    #[test]
    fn test_parse_target_unknown_endpoint() {
        for target in ["/", "/api/v1/ws/rooms/r1", "/api/v2/ws/rooms/r1/join?userId=a"] {
            assert_eq!(parse_target(target), Err(TargetError::UnknownEndpoint), "{target}");
        }
    }

    #[test]
    fn test_target_error_text_reaches_client() {
        let err = ProtocolError::from(TargetError::MissingUserId);
        assert!(matches!(err, ProtocolError::InvalidMessage(ref text) if text == "user ID is required"));
    }
}
