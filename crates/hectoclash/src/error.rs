//! Unified error type for the Hectoclash server.

use hectoclash_protocol::ProtocolError;
use hectoclash_room::RoomError;
use hectoclash_transport::TransportError;

use crate::StoreError;

/// Top-level error wrapping every sub-crate error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors, so the
/// connection handler and server loop only deal with this one type.
#[derive(Debug, thiserror::Error)]
pub enum HectoclashError {
    /// Bind, accept, or socket I/O failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame couldn't be encoded or decoded, or the upgrade target was
    /// malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The room hub is gone or rejected the request.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The game store failed or had no record.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use hectoclash_protocol::RoomId;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("room ID is required".into());
        let err: HectoclashError = err.into();
        assert!(matches!(err, HectoclashError::Protocol(_)));
        assert!(err.to_string().contains("room ID is required"));
    }

    #[test]
    fn test_from_room_error() {
        let err: HectoclashError = RoomError::HubUnavailable.into();
        assert!(matches!(err, HectoclashError::Room(_)));
    }

    #[test]
    fn test_from_store_error() {
        let err: HectoclashError = StoreError::RoomNotFound(RoomId::from("r9")).into();
        assert!(matches!(err, HectoclashError::Store(_)));
        assert!(err.to_string().contains("r9"));
    }
}
