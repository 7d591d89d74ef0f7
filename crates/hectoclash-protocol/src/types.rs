//! Message types for Hectoclash's wire format.
//!
//! On the wire every message is a flat JSON object:
//!
//! ```json
//! { "type": "puzzle_assign", "content": "119999", "roomId": "r1", "senderId": "alice" }
//! ```
//!
//! In Rust the `type`/`content` pair becomes one typed [`MessageBody`], so a
//! `puzzle_assign` always carries a valid [`DigitSequence`] and nothing
//! downstream has to re-check the string. The flat shape lives only in the
//! private `WireFrame`, which serde converts through.

use std::fmt;

use hectoclash_engine::DigitSequence;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The player id a client supplies when it connects (`?userId=`).
///
/// `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The room id from the connection path (`/rooms/{roomId}/join`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// The `type` field of a wire frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    JoinSuccess,
    Leave,
    LeaveSuccess,
    OpponentLeft,
    Submit,
    RoomCreated,
    RoomFull,
    End,
    Error,
    WrongSubmission,
    PuzzleAssign,
    CorrectSubmission,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JoinSuccess => "join_success",
            Self::Leave => "leave",
            Self::LeaveSuccess => "leave_success",
            Self::OpponentLeft => "opponent_left",
            Self::Submit => "submit",
            Self::RoomCreated => "room_created",
            Self::RoomFull => "room_full",
            Self::End => "end",
            Self::Error => "error",
            Self::WrongSubmission => "wrong_submission",
            Self::PuzzleAssign => "puzzle_assign",
            Self::CorrectSubmission => "correct_submission",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MessageBody + Message
// ---------------------------------------------------------------------------

/// The typed payload of a message, one variant per [`MessageType`].
///
/// Most variants carry human-readable text. `Submit` carries the submitted
/// expression and `PuzzleAssign` the room's digits. `Leave` has no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    JoinSuccess(String),
    Leave,
    LeaveSuccess(String),
    OpponentLeft(String),
    Submit(String),
    RoomCreated(String),
    RoomFull(String),
    End(String),
    Error(String),
    WrongSubmission(String),
    PuzzleAssign(DigitSequence),
    CorrectSubmission(String),
}

impl MessageBody {
    pub fn kind(&self) -> MessageType {
        match self {
            Self::JoinSuccess(_) => MessageType::JoinSuccess,
            Self::Leave => MessageType::Leave,
            Self::LeaveSuccess(_) => MessageType::LeaveSuccess,
            Self::OpponentLeft(_) => MessageType::OpponentLeft,
            Self::Submit(_) => MessageType::Submit,
            Self::RoomCreated(_) => MessageType::RoomCreated,
            Self::RoomFull(_) => MessageType::RoomFull,
            Self::End(_) => MessageType::End,
            Self::Error(_) => MessageType::Error,
            Self::WrongSubmission(_) => MessageType::WrongSubmission,
            Self::PuzzleAssign(_) => MessageType::PuzzleAssign,
            Self::CorrectSubmission(_) => MessageType::CorrectSubmission,
        }
    }

    /// The `content` string this body is sent with.
    pub fn content(&self) -> String {
        match self {
            Self::Leave => String::new(),
            Self::PuzzleAssign(digits) => digits.to_string(),
            Self::JoinSuccess(text)
            | Self::LeaveSuccess(text)
            | Self::OpponentLeft(text)
            | Self::Submit(text)
            | Self::RoomCreated(text)
            | Self::RoomFull(text)
            | Self::End(text)
            | Self::Error(text)
            | Self::WrongSubmission(text)
            | Self::CorrectSubmission(text) => text.clone(),
        }
    }

    /// Rebuilds a body from its wire parts.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] when a `puzzle_assign`
    /// content is not a valid digit sequence.
    pub fn from_parts(kind: MessageType, content: String) -> Result<Self, ProtocolError> {
        Ok(match kind {
            MessageType::JoinSuccess => Self::JoinSuccess(content),
            MessageType::Leave => Self::Leave,
            MessageType::LeaveSuccess => Self::LeaveSuccess(content),
            MessageType::OpponentLeft => Self::OpponentLeft(content),
            MessageType::Submit => Self::Submit(content),
            MessageType::RoomCreated => Self::RoomCreated(content),
            MessageType::RoomFull => Self::RoomFull(content),
            MessageType::End => Self::End(content),
            MessageType::Error => Self::Error(content),
            MessageType::WrongSubmission => Self::WrongSubmission(content),
            MessageType::PuzzleAssign => {
                let digits = content
                    .parse()
                    .map_err(|e| ProtocolError::InvalidMessage(format!("puzzle_assign: {e}")))?;
                Self::PuzzleAssign(digits)
            }
            MessageType::CorrectSubmission => Self::CorrectSubmission(content),
        })
    }
}

/// One message between a client and the server.
///
/// `room_id` and `sender_id` are what the client sent on the way in. The
/// connection handler overwrites both with the connection's own ids before
/// anything reaches the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireFrame", into = "WireFrame")]
pub struct Message {
    pub body: MessageBody,
    pub room_id: RoomId,
    pub sender_id: Option<PlayerId>,
}

impl Message {
    /// Creates a message with no sender.
    pub fn new(body: MessageBody, room_id: RoomId) -> Self {
        Self {
            body,
            room_id,
            sender_id: None,
        }
    }

    pub fn with_sender(mut self, sender: PlayerId) -> Self {
        self.sender_id = Some(sender);
        self
    }

    pub fn kind(&self) -> MessageType {
        self.body.kind()
    }
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

/// The flat JSON object actually sent and received.
///
/// `content` is an `Option<String>` so a missing or `null` content reads
/// as empty, while a number or object is rejected by serde.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFrame {
    #[serde(rename = "type")]
    kind: MessageType,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_id: Option<PlayerId>,
}

impl TryFrom<WireFrame> for Message {
    type Error = ProtocolError;

    fn try_from(frame: WireFrame) -> Result<Self, Self::Error> {
        Ok(Self {
            body: MessageBody::from_parts(frame.kind, frame.content.unwrap_or_default())?,
            room_id: frame.room_id,
            sender_id: frame.sender_id,
        })
    }
}

impl From<Message> for WireFrame {
    fn from(msg: Message) -> Self {
        Self {
            kind: msg.body.kind(),
            content: Some(msg.body.content()),
            room_id: msg.room_id,
            sender_id: msg.sender_id,
        }
    }
}

#[cfg(test)]
mod tests {
    //! JSON shape tests. A mismatch here means browser clients can't parse
    //! what the server sends.

    use super::*;

    fn decode(json: &str) -> Result<Message, serde_json::Error> {
        serde_json::from_str(json)
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        assert_eq!(serde_json::to_string(&PlayerId::from("alice")).unwrap(), "\"alice\"");
        assert_eq!(serde_json::to_string(&RoomId::from("r1")).unwrap(), "\"r1\"");
        assert_eq!(RoomId::from("r1").to_string(), "r1");
    }

    // =====================================================================
    // MessageType
    // =====================================================================

    #[test]
    fn test_message_type_names_match_serde() {
        let all = [
            MessageType::JoinSuccess,
            MessageType::Leave,
            MessageType::LeaveSuccess,
            MessageType::OpponentLeft,
            MessageType::Submit,
            MessageType::RoomCreated,
            MessageType::RoomFull,
            MessageType::End,
            MessageType::Error,
            MessageType::WrongSubmission,
            MessageType::PuzzleAssign,
            MessageType::CorrectSubmission,
        ];
        for kind in all {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    // =====================================================================
    // Message decoding
    // =====================================================================

    #[test]
    fn test_puzzle_assign_decodes_to_digits() {
        let msg = decode(r#"{"type":"puzzle_assign","content":"119999","roomId":"r1","senderId":"a"}"#)
            .unwrap();
        assert_eq!(msg.body, MessageBody::PuzzleAssign("119999".parse().unwrap()));
        assert_eq!(msg.sender_id, Some(PlayerId::from("a")));
    }

    #[test]
    fn test_puzzle_assign_with_bad_digits_is_rejected() {
        assert!(decode(r#"{"type":"puzzle_assign","content":"12","roomId":"r1"}"#).is_err());
        assert!(decode(r#"{"type":"puzzle_assign","content":"120456","roomId":"r1"}"#).is_err());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(decode(r#"{"type":"chat","content":"hi","roomId":"r1"}"#).is_err());
        assert!(decode(r#"{"content":"hi","roomId":"r1"}"#).is_err());
    }

    #[test]
    fn test_non_string_content_is_rejected() {
        assert!(decode(r#"{"type":"submit","content":42,"roomId":"r1"}"#).is_err());
        assert!(decode(r#"{"type":"submit","content":{"x":1},"roomId":"r1"}"#).is_err());
    }

    #[test]
    fn test_missing_or_null_content_is_empty() {
        let msg = decode(r#"{"type":"leave","roomId":"r1"}"#).unwrap();
        assert_eq!(msg.body, MessageBody::Leave);

        let msg = decode(r#"{"type":"submit","content":null,"roomId":"r1"}"#).unwrap();
        assert_eq!(msg.body, MessageBody::Submit(String::new()));
    }

    #[test]
    fn test_missing_room_id_defaults_to_empty() {
        let msg = decode(r#"{"type":"submit","content":"1+1"}"#).unwrap();
        assert_eq!(msg.room_id, RoomId::default());
    }

    // =====================================================================
    // Message encoding
    // =====================================================================

    #[test]
    fn test_leave_encodes_empty_content() {
        let json = serde_json::to_value(Message::new(MessageBody::Leave, RoomId::from("r1"))).unwrap();
        assert_eq!(json["type"], "leave");
        assert_eq!(json["content"], "");
    }

    #[test]
    fn test_absent_sender_is_omitted() {
        let msg = Message::new(MessageBody::RoomCreated("Room created successfully".into()), "r1".into());
        let json = serde_json::to_value(msg).unwrap();
        assert!(json.get("senderId").is_none());
        assert_eq!(json["roomId"], "r1");
    }

    #[test]
    fn test_puzzle_assign_encodes_digit_string() {
        let msg = Message::new(MessageBody::PuzzleAssign("472319".parse().unwrap()), "r1".into())
            .with_sender("alice".into());
        let json = serde_json::to_value(msg).unwrap();
        assert_eq!(json["type"], "puzzle_assign");
        assert_eq!(json["content"], "472319");
        assert_eq!(json["senderId"], "alice");
    }
}
