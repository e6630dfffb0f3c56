//! Timestamp utilities

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Get today's date in local time
///
/// Business rules (past-date guards, reminder arithmetic) work on the
/// venue's local calendar day, not UTC.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Whether the venue runs a night on this weekday (Thursday through Saturday)
pub fn is_show_night(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Thu | Weekday::Fri | Weekday::Sat)
}
