//! Database models

use crate::slot::Slot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Performer account lifecycle state
///
/// Self-registration creates `Pending`; admin creation starts `Active`;
/// deactivation is a soft transition to `Inactive`. Hard removal deletes
/// the row (and cascades availabilities and assignments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformerStatus {
    Pending,
    Active,
    Inactive,
}

impl PerformerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformerStatus::Pending => "pending",
            PerformerStatus::Active => "active",
            PerformerStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<PerformerStatus> {
        match s {
            "pending" => Some(PerformerStatus::Pending),
            "active" => Some(PerformerStatus::Active),
            "inactive" => Some(PerformerStatus::Inactive),
            _ => None,
        }
    }
}

/// A performer (DJ) account
///
/// Password material stays in the database; it is never part of this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performer {
    pub guid: String,
    pub username: String,
    pub email: String,
    pub dj_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub status: PerformerStatus,
}

/// Roster entry: performer plus their total assignment count
#[derive(Debug, Clone, Serialize)]
pub struct PerformerOverview {
    #[serde(flatten)]
    pub performer: Performer,
    pub assignment_count: i64,
}

/// A performer's declared willingness for one date
///
/// At most one row per (performer, date); `slot` is None when not willing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub guid: String,
    pub performer_id: String,
    pub date: NaiveDate,
    pub willing: bool,
    pub slot: Option<Slot>,
    pub notes: Option<String>,
}

/// A confirmed booking of one performer to one (date, slot)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub guid: String,
    pub performer_id: String,
    pub date: NaiveDate,
    pub slot: Slot,
    pub fee: i64,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Assignment joined with the assigned performer's identity
///
/// Used by reminder dispatch and the monthly report feed.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentWithPerformer {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub dj_name: String,
    pub email: String,
}
