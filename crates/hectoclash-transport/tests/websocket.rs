//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;

    use futures_util::{SinkExt, StreamExt};
    use hectoclash_transport::{Connection, Transport, WebSocketConnection, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport on port 0, connects one client to `path`, and
    /// returns both ends.
    async fn connected_pair(path: &str) -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address");

        let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let url = format!("ws://{addr}{path}");
        let (client, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");

        let conn = server.await.expect("accept task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_request_target_is_captured() {
        let (conn, _client) = connected_pair("/api/v1/ws/rooms/r1/join?userId=alice").await;
        assert_eq!(conn.request_target(), "/api/v1/ws/rooms/r1/join?userId=alice");
        assert!(conn.id().into_inner() > 0);
        assert!(conn.peer_addr().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_send_uses_text_frames_for_utf8() {
        let (conn, mut client) = connected_pair("/").await;

        conn.send(br#"{"type":"end"}"#).await.expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"end"}"#);

        conn.send(&[0xff, 0x00]).await.expect("send should succeed");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
    }

    #[tokio::test]
    async fn test_recv_text_and_binary() {
        let (conn, mut client) = connected_pair("/").await;

        client.send(Message::Text("hello".into())).await.unwrap();
        client
            .send(Message::Binary(b"bytes".to_vec().into()))
            .await
            .unwrap();

        assert_eq!(conn.recv().await.unwrap().unwrap(), b"hello");
        assert_eq!(conn.recv().await.unwrap().unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (conn, mut client) = connected_pair("/").await;

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_send_while_recv_is_pending() {
        let (conn, mut client) = connected_pair("/").await;
        let conn = Arc::new(conn);

        // Park a reader first; the writer must not wait for it.
        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::task::yield_now().await;

        conn.send(b"ping").await.expect("send should not block");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client.send(Message::Text("pong".into())).await.unwrap();
        let received = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(received, b"pong");
    }

    #[tokio::test]
    async fn test_server_close_reaches_client() {
        let (conn, mut client) = connected_pair("/").await;

        conn.close().await.expect("close should succeed");

        match client.next().await {
            Some(Ok(Message::Close(_))) | None => {}
            other => panic!("expected close frame, got {other:?}"),
        }
    }
}
