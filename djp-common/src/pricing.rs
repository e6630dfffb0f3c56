//! Fee schedule
//!
//! Fees are a pure function of date and slot, banded by day of week.
//! The fee is computed once when an assignment is created and persisted
//! with it; nothing here reads external state.

use crate::slot::Slot;
use chrono::{Datelike, NaiveDate, Weekday};

/// Fee in whole currency units for working `slot` on `date`
///
/// Bands: Thursday / Friday-Saturday / every other day, each with its own
/// fixed price per slot.
pub fn fee(date: NaiveDate, slot: Slot) -> i64 {
    match date.weekday() {
        Weekday::Thu => match slot {
            Slot::Complete => 120,
            Slot::Warmup => 40,
            Slot::Peaktime => 80,
        },
        Weekday::Fri | Weekday::Sat => match slot {
            Slot::Complete => 200,
            Slot::Warmup => 50,
            Slot::Peaktime => 150,
        },
        _ => match slot {
            Slot::Complete => 100,
            Slot::Warmup => 30,
            Slot::Peaktime => 70,
        },
    }
}

/// Fee for a raw slot label as stored in legacy rows
///
/// Unrecognized labels are priced at 0 rather than rejected. Legacy data
/// can carry arbitrary text in the slot column; the fee backfill migration
/// relies on this being total.
pub fn fee_for_label(date: NaiveDate, label: &str) -> i64 {
    match Slot::parse(label) {
        Some(slot) => fee(date, slot),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn thursday_band() {
        let thu = date(2026, 3, 5);
        assert_eq!(thu.weekday(), Weekday::Thu);
        assert_eq!(fee(thu, Slot::Complete), 120);
        assert_eq!(fee(thu, Slot::Warmup), 40);
        assert_eq!(fee(thu, Slot::Peaktime), 80);
    }

    #[test]
    fn weekend_band() {
        let fri = date(2026, 3, 6);
        let sat = date(2026, 3, 7);
        assert_eq!(fri.weekday(), Weekday::Fri);
        assert_eq!(sat.weekday(), Weekday::Sat);
        assert_eq!(fee(fri, Slot::Complete), 200);
        assert_eq!(fee(fri, Slot::Warmup), 50);
        assert_eq!(fee(fri, Slot::Peaktime), 150);
        assert_eq!(fee(sat, Slot::Peaktime), 150);
    }

    #[test]
    fn weekday_band() {
        let tue = date(2026, 3, 3);
        assert_eq!(tue.weekday(), Weekday::Tue);
        assert_eq!(fee(tue, Slot::Complete), 100);
        assert_eq!(fee(tue, Slot::Warmup), 30);
        assert_eq!(fee(tue, Slot::Peaktime), 70);
    }

    #[test]
    fn fee_is_deterministic() {
        let d = date(2026, 3, 6);
        assert_eq!(fee(d, Slot::Warmup), fee(d, Slot::Warmup));
    }

    #[test]
    fn unknown_label_prices_at_zero() {
        let d = date(2026, 3, 5);
        assert_eq!(fee_for_label(d, "complete"), 120);
        assert_eq!(fee_for_label(d, "afterhours"), 0);
        assert_eq!(fee_for_label(d, ""), 0);
    }
}
