//! Hub configuration and the room state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// HubConfig
// ---------------------------------------------------------------------------

/// Queue sizes and delivery limits for the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Capacity of each client's outbound queue.
    pub outbound_capacity: usize,

    /// How many events may wait in the hub's intake queue. Senders past
    /// this wait for a slot.
    pub intake_capacity: usize,

    /// How long the hub waits on a full outbound queue before dropping
    /// the message for that client.
    pub delivery_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 10,
            intake_capacity: 32,
            delivery_timeout: Duration::from_millis(50),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// (none) ──join──▶ Waiting ──join──▶ Active ──correct answer──▶ (none)
///                     ▲                 │
///                     └───one leaves────┘
/// ```
///
/// A room whose last client leaves is removed from either state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    /// Zero or one client, no puzzle.
    Waiting,
    /// Two clients and a puzzle.
    Active,
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Active => write!(f, "Active"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_default() {
        let config = HubConfig::default();
        assert_eq!(config.outbound_capacity, 10);
        assert_eq!(config.intake_capacity, 32);
        assert_eq!(config.delivery_timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_room_state_display() {
        assert_eq!(RoomState::Waiting.to_string(), "Waiting");
        assert_eq!(RoomState::Active.to_string(), "Active");
    }
}
