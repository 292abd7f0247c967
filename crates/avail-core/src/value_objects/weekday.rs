//! Weekday - the day axis of the availability grid
//!
//! Weeks run Sunday through Saturday, matching the posting order of the
//! weekly poll grid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week, Sunday-first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// All days in posting order (Sunday first)
    pub const ALL: [Weekday; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Get the uppercase name used in poll labels and store rows
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SUNDAY",
            Self::Monday => "MONDAY",
            Self::Tuesday => "TUESDAY",
            Self::Wednesday => "WEDNESDAY",
            Self::Thursday => "THURSDAY",
            Self::Friday => "FRIDAY",
            Self::Saturday => "SATURDAY",
        }
    }

    /// Position within the Sunday-first week (0-6)
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|d| *d == self).unwrap_or(0)
    }

    /// Convert from a chrono weekday
    #[must_use]
    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUNDAY" => Ok(Self::Sunday),
            "MONDAY" => Ok(Self::Monday),
            "TUESDAY" => Ok(Self::Tuesday),
            "WEDNESDAY" => Ok(Self::Wednesday),
            "THURSDAY" => Ok(Self::Thursday),
            "FRIDAY" => Ok(Self::Friday),
            "SATURDAY" => Ok(Self::Saturday),
            other => Err(format!("Invalid weekday: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_order_is_sunday_first() {
        assert_eq!(Weekday::ALL[0], Weekday::Sunday);
        assert_eq!(Weekday::ALL[6], Weekday::Saturday);
        assert_eq!(Weekday::Monday.position(), 1);
    }

    #[test]
    fn test_parse_roundtrip() {
        for day in Weekday::ALL {
            assert_eq!(day.as_str().parse::<Weekday>().unwrap(), day);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!(" Friday ".parse::<Weekday>().unwrap(), Weekday::Friday);
        assert!("MOONDAY".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_from_chrono() {
        assert_eq!(Weekday::from_chrono(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!(Weekday::from_chrono(chrono::Weekday::Sat), Weekday::Saturday);
    }
}
