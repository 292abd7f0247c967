//! Row models - layouts of the store tables and entity conversions
//!
//! Cells arrive as strings; parsing is total per cell and fallible per
//! row. Malformed rows are reported with their index so repositories can
//! skip them (with a warning) instead of failing a whole read.

use chrono::{DateTime, Utc};
use thiserror::Error;

use avail_core::{AvailabilityPoll, AvailabilityRecord, League, Snowflake};

use crate::client::Row;

/// Header of the poll index table
pub const POLL_HEADER: [&str; 5] = ["League", "Channel ID", "Message ID", "Label", "Created At"];

/// Header of every per-league records table
pub const RECORD_HEADER: [&str; 7] = [
    "Timestamp",
    "User Name",
    "User ID",
    "Emoji",
    "Message ID",
    "Day",
    "League",
];

/// Errors when parsing a row into an entity
#[derive(Debug, Error)]
pub enum RowError {
    #[error("row too short: expected {expected} cells, got {got}")]
    TooShort { expected: usize, got: usize },

    #[error("invalid cell {column}: {value}")]
    InvalidCell { column: &'static str, value: String },
}

fn cell<'a>(row: &'a [String], index: usize, expected: usize) -> Result<&'a str, RowError> {
    row.get(index).map(String::as_str).ok_or(RowError::TooShort {
        expected,
        got: row.len(),
    })
}

fn parse_snowflake(value: &str, column: &'static str) -> Result<Snowflake, RowError> {
    Snowflake::parse(value).map_err(|_| RowError::InvalidCell {
        column,
        value: value.to_string(),
    })
}

fn parse_league(value: &str, column: &'static str) -> Result<League, RowError> {
    League::parse(value).map_err(|_| RowError::InvalidCell {
        column,
        value: value.to_string(),
    })
}

/// Timestamps are stored as RFC 3339; rows written by earlier revisions
/// may carry anything else, which falls back to the epoch rather than
/// poisoning the row.
fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

// ============================================================================
// Poll rows
// ============================================================================

/// Convert a poll entity to its store row
#[must_use]
pub fn poll_to_row(poll: &AvailabilityPoll) -> Row {
    vec![
        poll.league.to_string(),
        poll.channel_id.to_string(),
        poll.message_id.to_string(),
        poll.day_label.clone(),
        poll.created_at.to_rfc3339(),
    ]
}

/// Parse a poll row back into its entity
pub fn parse_poll(row: &[String]) -> Result<AvailabilityPoll, RowError> {
    let expected = 4; // Created At is tolerated missing in old rows
    let league = parse_league(cell(row, 0, expected)?, "League")?;
    let channel_id = parse_snowflake(cell(row, 1, expected)?, "Channel ID")?;
    let message_id = parse_snowflake(cell(row, 2, expected)?, "Message ID")?;
    let day_label = cell(row, 3, expected)?.to_string();
    let created_at = row.get(4).map(|s| parse_timestamp(s)).unwrap_or_default();

    Ok(AvailabilityPoll {
        league,
        channel_id,
        message_id,
        day_label,
        created_at,
    })
}

// ============================================================================
// Record rows
// ============================================================================

/// Convert a record entity to its store row
#[must_use]
pub fn record_to_row(record: &AvailabilityRecord) -> Row {
    vec![
        record.timestamp.to_rfc3339(),
        record.user_name.clone(),
        record.user_id.to_string(),
        record.emoji.clone(),
        record.message_id.to_string(),
        record.day_label.clone(),
        record.league.to_string(),
    ]
}

/// Parse a record row back into its entity
pub fn parse_record(row: &[String]) -> Result<AvailabilityRecord, RowError> {
    let expected = RECORD_HEADER.len();
    let timestamp = parse_timestamp(cell(row, 0, expected)?);
    let user_name = cell(row, 1, expected)?.to_string();
    let user_id = parse_snowflake(cell(row, 2, expected)?, "User ID")?;
    let emoji = cell(row, 3, expected)?.to_string();
    let message_id = parse_snowflake(cell(row, 4, expected)?, "Message ID")?;
    let day_label = cell(row, 5, expected)?.to_string();
    let league = parse_league(cell(row, 6, expected)?, "League")?;

    Ok(AvailabilityRecord {
        timestamp,
        user_name,
        user_id,
        emoji,
        message_id,
        day_label,
        league,
    })
}
