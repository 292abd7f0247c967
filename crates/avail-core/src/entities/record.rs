//! Availability record entity - one persisted per-user, per-slot fact

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FactKey, League, Snowflake, Weekday};

/// One persisted availability fact: user X is available at slot Y on day Z.
///
/// At most one record may exist per fact key at any observable time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
    pub user_id: Snowflake,
    /// Canonical slot emoji name, e.g. "7PM"
    pub emoji: String,
    pub message_id: Snowflake,
    /// Weekday word, e.g. "MONDAY"
    pub day_label: String,
    pub league: League,
}

impl AvailabilityRecord {
    /// Create a record stamped with the current time
    pub fn new(
        user_id: Snowflake,
        user_name: impl Into<String>,
        emoji: impl Into<String>,
        message_id: Snowflake,
        day: Weekday,
        league: League,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_name: user_name.into(),
            user_id,
            emoji: emoji.into(),
            message_id,
            day_label: day.as_str().to_string(),
            league,
        }
    }

    /// Build the persisted form of an Add event, given the poll context
    /// the listener classified it into
    #[must_use]
    pub fn from_event(event: &super::AvailabilityEvent, day: Weekday, league: League) -> Self {
        Self {
            timestamp: event.timestamp,
            user_name: event.user_name.clone(),
            user_id: event.user_id,
            emoji: event.emoji.clone(),
            message_id: event.message_id,
            day_label: day.as_str().to_string(),
            league,
        }
    }

    /// The identity tuple of this record
    #[must_use]
    pub fn fact_key(&self) -> FactKey {
        FactKey::new(self.user_id, self.emoji.clone(), self.message_id)
    }

    /// The weekday this record belongs to
    #[must_use]
    pub fn weekday(&self) -> Option<Weekday> {
        self.day_label.parse().ok()
    }
}
