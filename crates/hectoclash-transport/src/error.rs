#[cfg(feature = "websocket")]
use tokio_tungstenite::tungstenite;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The WebSocket upgrade did not complete.
    #[cfg(feature = "websocket")]
    #[error("handshake failed: {0}")]
    HandshakeFailed(#[source] tungstenite::Error),

    /// Sending a frame failed.
    #[cfg(feature = "websocket")]
    #[error("send failed: {0}")]
    SendFailed(#[source] tungstenite::Error),

    /// Reading the next frame failed.
    #[cfg(feature = "websocket")]
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] tungstenite::Error),
}
