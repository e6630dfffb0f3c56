//! Booking slot definitions
//!
//! A calendar date is divided into two half-slots (warmup and peaktime)
//! plus a whole-night slot (complete). Complete is mutually exclusive with
//! the half-slots: a complete assignment occupies the entire date.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-division of a date's booking
///
/// Stored in the database as the lowercase labels `warmup`, `peaktime`
/// and `complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// Opening set, first half of the night
    Warmup,
    /// Main set, second half of the night
    Peaktime,
    /// Whole night, superset of both half-slots
    Complete,
}

impl Slot {
    /// Canonical database/API label
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Warmup => "warmup",
            Slot::Peaktime => "peaktime",
            Slot::Complete => "complete",
        }
    }

    /// Parse a label, returning None for anything unrecognized
    pub fn parse(s: &str) -> Option<Slot> {
        match s {
            "warmup" => Some(Slot::Warmup),
            "peaktime" => Some(Slot::Peaktime),
            "complete" => Some(Slot::Complete),
            _ => None,
        }
    }

    /// Whether a performer declared for `self` can cover `other`
    ///
    /// Complete covers everything; a half-slot only covers itself.
    pub fn covers(&self, other: Slot) -> bool {
        *self == Slot::Complete || *self == other
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_canonical_labels() {
        for slot in [Slot::Warmup, Slot::Peaktime, Slot::Complete] {
            assert_eq!(Slot::parse(slot.as_str()), Some(slot));
        }
    }

    #[test]
    fn parse_rejects_unknown_labels() {
        assert_eq!(Slot::parse("afterhours"), None);
        assert_eq!(Slot::parse(""), None);
        assert_eq!(Slot::parse("WARMUP"), None);
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        assert_eq!(serde_json::to_string(&Slot::Peaktime).unwrap(), "\"peaktime\"");
        let parsed: Slot = serde_json::from_str("\"complete\"").unwrap();
        assert_eq!(parsed, Slot::Complete);
    }

    #[test]
    fn complete_covers_both_halves() {
        assert!(Slot::Complete.covers(Slot::Warmup));
        assert!(Slot::Complete.covers(Slot::Peaktime));
        assert!(!Slot::Warmup.covers(Slot::Peaktime));
        assert!(Slot::Peaktime.covers(Slot::Peaktime));
    }
}
