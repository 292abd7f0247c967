//! Availability event - normalized, ephemeral reaction signal
//!
//! Produced by the listener after classifying a raw gateway signal against
//! the poll index. Never persisted to the backing store; Add events pass
//! through the journal and batch queue, Remove events apply immediately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FactKey, Snowflake};

/// Direction of a reaction signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Add,
    Remove,
}

/// Normalized reaction event for a tracked poll message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEvent {
    pub kind: ReactionKind,
    pub user_id: Snowflake,
    pub user_name: String,
    /// Canonical emoji name
    pub emoji: String,
    pub message_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

impl AvailabilityEvent {
    /// Create an event stamped with the current time
    pub fn new(
        kind: ReactionKind,
        user_id: Snowflake,
        user_name: impl Into<String>,
        emoji: impl Into<String>,
        message_id: Snowflake,
    ) -> Self {
        Self {
            kind,
            user_id,
            user_name: user_name.into(),
            emoji: emoji.into(),
            message_id,
            timestamp: Utc::now(),
        }
    }

    /// The identity tuple of the fact this event concerns
    #[must_use]
    pub fn fact_key(&self) -> FactKey {
        FactKey::new(self.user_id, self.emoji.clone(), self.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_share_fact_key() {
        let add = AvailabilityEvent::new(
            ReactionKind::Add,
            Snowflake::new(1),
            "alice",
            "5PM",
            Snowflake::new(10),
        );
        let remove = AvailabilityEvent::new(
            ReactionKind::Remove,
            Snowflake::new(1),
            "alice",
            "5PM",
            Snowflake::new(10),
        );
        assert_eq!(add.fact_key(), remove.fact_key());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&ReactionKind::Add).unwrap(), "\"add\"");
        assert_eq!(
            serde_json::to_string(&ReactionKind::Remove).unwrap(),
            "\"remove\""
        );
    }
}
