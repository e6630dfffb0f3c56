//! HTTP API handlers for djp-ui

pub mod assignments;
pub mod availability;
pub mod calendar;
pub mod error;
pub mod health;
pub mod performers;
pub mod report;

pub use error::{ApiError, ApiResult};

use chrono::NaiveDate;
use djp_common::{Error, Slot};

/// Parse an ISO date from request input
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("invalid date: {}", raw)))
}

/// Parse a slot label from request input
pub(crate) fn parse_slot(raw: &str) -> Result<Slot, Error> {
    Slot::parse(raw).ok_or_else(|| Error::Validation(format!("invalid slot: {}", raw)))
}
