//! Common error types for the planning services

use crate::slot::Slot;
use chrono::NaiveDate;
use thiserror::Error;

/// Common result type for planning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the planning services
///
/// Everything here is an expected, recoverable condition reported to the
/// caller. Storage-layer constraint violations from racing assignment
/// requests are translated to [`Error::SlotConflict`] before they leave the
/// resolver.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed date, slot, or other request input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Operation on a date strictly before today
    #[error("Date {0} is in the past")]
    PastDate(NaiveDate),

    /// Performer has no willing availability for the date
    #[error("Performer is not available on {0}")]
    NotAvailable(NaiveDate),

    /// Requested slot (or, for a complete request, every remaining slot) is taken
    #[error("{}", slot_conflict_message(.0))]
    SlotConflict(Slot),

    /// A complete-night assignment already covers the date
    #[error("Complete night already assigned on {0}")]
    CompleteNightConflict(NaiveDate),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Username or email already registered
    #[error("Identity already taken: {0}")]
    DuplicateIdentity(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn slot_conflict_message(slot: &Slot) -> String {
    match slot {
        // A complete request with both halves occupied has no open slot left.
        Slot::Complete => "no open slot: warmup and peaktime already assigned".to_string(),
        s => format!("{} slot already assigned", s),
    }
}
