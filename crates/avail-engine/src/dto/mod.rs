//! Data transfer objects - inbound event shapes and query responses

use serde::{Deserialize, Serialize};

use avail_core::{League, ReactionKind, Snowflake, Weekday};

// ============================================================================
// Inbound events
// ============================================================================

/// Raw reaction signal kind as delivered by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    ReactionAdd,
    ReactionRemove,
}

impl From<InboundKind> for ReactionKind {
    fn from(kind: InboundKind) -> Self {
        match kind {
            InboundKind::ReactionAdd => Self::Add,
            InboundKind::ReactionRemove => Self::Remove,
        }
    }
}

/// Raw reaction signal for an arbitrary message
#[derive(Debug, Clone, Deserialize)]
pub struct InboundReaction {
    pub kind: InboundKind,
    pub user_id: Snowflake,
    /// Display name when the gateway provides member info
    #[serde(default)]
    pub user_name: Option<String>,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub emoji_name: String,
    /// Set when the reacting user is a bot account
    #[serde(default)]
    pub is_bot: bool,
}

impl InboundReaction {
    /// Display name, falling back to the user id
    #[must_use]
    pub fn display_name(&self) -> String {
        self.user_name
            .clone()
            .unwrap_or_else(|| self.user_id.to_string())
    }
}

// ============================================================================
// Operation reports
// ============================================================================

/// Result of posting a weekly poll grid
#[derive(Debug, Clone, Serialize)]
pub struct PostPollReport {
    pub league: League,
    pub posted: usize,
}

/// Result of deleting a poll cycle
#[derive(Debug, Clone, Serialize)]
pub struct DeletePollReport {
    pub league: League,
    pub messages_deleted: usize,
    pub records_deleted: u64,
    pub polls_deleted: u64,
}

// ============================================================================
// Query responses
// ============================================================================

/// Signal count for one time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCount {
    pub emoji: String,
    pub count: u32,
}

/// Per-slot counts for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub day: Weekday,
    pub slots: Vec<SlotCount>,
}

/// Aggregate counts for a league, all seven days in week order
#[derive(Debug, Clone, Serialize)]
pub struct LeagueAvailability {
    pub league: League,
    pub days: Vec<DayCounts>,
}

impl LeagueAvailability {
    /// Render the summary block posted to the summary channel
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!("**CURRENT {} AVAILABILITY**", self.league)];
        for day in &self.days {
            let slots = day
                .slots
                .iter()
                .map(|s| format!("{} {}", s.emoji, s.count))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(format!("**{}:** {}", day.day, slots));
        }
        lines.join("\n")
    }
}

/// One user's slots for a day, in canonical slot order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSlots {
    pub user_id: Snowflake,
    pub user_name: String,
    pub slots: Vec<String>,
}

/// Per-user listing for one (league, day)
#[derive(Debug, Clone, Serialize)]
pub struct DayRoster {
    pub league: League,
    pub day: Weekday,
    pub users: Vec<UserSlots>,
}

impl DayRoster {
    /// Check whether any user has signalled availability
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Render the roster block posted to the summary channel
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!("**{}**", self.day)];
        for user in &self.users {
            lines.push(format!("<@{}>: {}", user.user_id, user.slots.join(", ")));
        }
        lines.join("\n")
    }
}
