//! Availability poll entity - one posted day message of a weekly grid

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{League, Snowflake, Weekday};

/// One availability poll message: a (league, day) entry of a posting cycle.
///
/// Created by the publisher, superseded or deleted by an explicit delete
/// operation, never mutated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPoll {
    pub league: League,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    /// Full display label, e.g. "MONDAY 04/14 | HC"
    pub day_label: String,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityPoll {
    /// Create a new poll entry
    pub fn new(
        league: League,
        channel_id: Snowflake,
        message_id: Snowflake,
        day_label: impl Into<String>,
    ) -> Self {
        Self {
            league,
            channel_id,
            message_id,
            day_label: day_label.into(),
            created_at: Utc::now(),
        }
    }

    /// The weekday this poll covers, parsed from the label's first token
    #[must_use]
    pub fn weekday(&self) -> Option<Weekday> {
        self.day_label.split_whitespace().next()?.parse().ok()
    }
}
