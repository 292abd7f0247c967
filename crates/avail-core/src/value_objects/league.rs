//! League - a named partition mapping to a separate backing table

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// League name (e.g. "HC", "AL"), always stored uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct League(String);

impl League {
    /// Parse and normalize a league name
    ///
    /// Names are uppercased; only ASCII alphanumerics are accepted.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::UnknownLeague(name.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the league name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
