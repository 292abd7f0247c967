//! Emoji identity and time-slot ordering
//!
//! Reaction payloads carry emoji in several shapes: a bare name ("5PM"),
//! custom-emoji markup ("<:5PM:1234>", animated "<a:5PM:1234>"), or a raw
//! unicode emoji. One canonical representation - the uppercased name - is
//! applied uniformly on both the add and remove paths, so the two sides of
//! a fact always agree on its identity.

/// Canonical ordered list of time-slot emoji names
pub const DEFAULT_SLOT_NAMES: [&str; 8] =
    ["5PM", "6PM", "7PM", "8PM", "9PM", "10PM", "11PM", "12AM"];

/// Reduce a raw emoji payload to its canonical identity.
///
/// Custom-emoji markup is reduced to the bare name; ASCII letters are
/// uppercased. Unicode emoji pass through unchanged.
#[must_use]
pub fn canonical_emoji(raw: &str) -> String {
    let trimmed = raw.trim();

    // <:name:id> or <a:name:id>
    let name = if trimmed.starts_with('<') && trimmed.ends_with('>') {
        let inner = trimmed.trim_start_matches('<').trim_end_matches('>');
        let inner = inner.strip_prefix("a:").unwrap_or(inner);
        let inner = inner.strip_prefix(':').unwrap_or(inner);
        inner.split(':').next().unwrap_or(inner)
    } else {
        trimmed
    };

    name.to_ascii_uppercase()
}

/// Canonical ordering of time-slot emoji within a day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotOrder {
    slots: Vec<String>,
}

impl SlotOrder {
    /// Create a slot order from canonical emoji names
    #[must_use]
    pub fn new(slots: Vec<String>) -> Self {
        Self { slots }
    }

    /// The slot names in canonical order
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Position of a canonical emoji name, if it is a recognized slot
    #[must_use]
    pub fn position(&self, emoji: &str) -> Option<usize> {
        self.slots.iter().position(|s| s == emoji)
    }

    /// Check whether a canonical emoji name is a recognized slot
    #[must_use]
    pub fn contains(&self, emoji: &str) -> bool {
        self.position(emoji).is_some()
    }

    /// Sort emoji names in place by canonical slot order; unrecognized
    /// names sort last, preserving their relative order.
    pub fn sort(&self, emoji: &mut [String]) {
        emoji.sort_by_key(|e| self.position(e).unwrap_or(usize::MAX));
    }
}

impl Default for SlotOrder {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_NAMES.iter().map(ToString::to_string).collect())
    }
}
