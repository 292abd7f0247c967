//! Fact key - the identity of one availability fact
//!
//! The (user, emoji, message) triple is the unit of uniqueness for the
//! whole engine: at most one persisted record may exist per key, and all
//! state transitions (queued, persisted, removed) are keyed by it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// The (user_id, emoji, message_id) triple identifying one fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactKey {
    pub user_id: Snowflake,
    pub emoji: String,
    pub message_id: Snowflake,
}

impl FactKey {
    /// Create a new fact key; the emoji must already be canonical
    #[must_use]
    pub fn new(user_id: Snowflake, emoji: impl Into<String>, message_id: Snowflake) -> Self {
        Self {
            user_id,
            emoji: emoji.into(),
            message_id,
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.emoji, self.message_id)
    }
}
