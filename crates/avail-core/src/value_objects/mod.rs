//! Value objects - immutable domain primitives

mod emoji;
mod fact_key;
mod league;
mod snowflake;
mod weekday;

pub use emoji::{canonical_emoji, SlotOrder, DEFAULT_SLOT_NAMES};
pub use fact_key::FactKey;
pub use league::League;
pub use snowflake::{Snowflake, SnowflakeParseError};
pub use weekday::Weekday;
