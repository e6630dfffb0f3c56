//! Assignment resolution
//!
//! The write side of the scheduler: validates an assignment request
//! against current state, downgrades a complete declaration to whichever
//! half-slot is still open, and creates the assignment with its fee in a
//! single transaction scoped to the date. The UNIQUE (date, slot)
//! constraint is the arbiter when two requests race; the checks here are
//! a pre-check optimization on top of it.

use crate::db::models::{Assignment, Availability};
use crate::db::{assignments, availability};
use crate::pricing;
use crate::slot::Slot;
use crate::{Error, Result};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// An assignment request
///
/// `today` and `requested_by` are explicit inputs; the resolver carries no
/// ambient clock or request context.
#[derive(Debug, Clone)]
pub struct AssignRequest {
    pub date: NaiveDate,
    pub performer_id: String,
    pub requested_by: String,
    pub notes: Option<String>,
    pub today: NaiveDate,
}

/// An availability declaration change
#[derive(Debug, Clone)]
pub struct AvailabilityChange {
    pub performer_id: String,
    pub date: NaiveDate,
    pub willing: bool,
    pub slot: Option<Slot>,
    pub notes: Option<String>,
    pub today: NaiveDate,
}

/// Resolve the slot an assignment would actually occupy
///
/// A complete declaration downgrades to the open half when the other half
/// is taken. Both halves taken means no room, whatever was declared.
pub fn resolve_slot(declared: Slot, has_warmup: bool, has_peaktime: bool) -> Result<Slot> {
    match declared {
        Slot::Warmup if has_warmup => Err(Error::SlotConflict(Slot::Warmup)),
        Slot::Warmup => Ok(Slot::Warmup),
        Slot::Peaktime if has_peaktime => Err(Error::SlotConflict(Slot::Peaktime)),
        Slot::Peaktime => Ok(Slot::Peaktime),
        Slot::Complete => match (has_warmup, has_peaktime) {
            (true, false) => Ok(Slot::Peaktime),
            (false, true) => Ok(Slot::Warmup),
            (true, true) => Err(Error::SlotConflict(Slot::Complete)),
            (false, false) => Ok(Slot::Complete),
        },
    }
}

/// Attempt to assign a performer to a date
///
/// Checks run in order, first failure wins:
/// 1. past date
/// 2. no willing availability for (performer, date)
/// 3. a complete assignment already covers the date
/// 4. slot resolution finds no open slot
///
/// On success the fee is computed from the schedule for the slot actually
/// occupied (not the declared one) and persisted with the assignment.
pub async fn try_assign(pool: &SqlitePool, req: AssignRequest) -> Result<Assignment> {
    if req.date < req.today {
        return Err(Error::PastDate(req.date));
    }

    let mut tx = pool.begin().await?;

    let avail = availability::get(&mut *tx, &req.performer_id, req.date).await?;
    let declared = match avail {
        Some(a) if a.willing => a
            .slot
            .ok_or_else(|| Error::Validation(format!("availability for {} has no slot", req.date)))?,
        _ => return Err(Error::NotAvailable(req.date)),
    };

    let taken = assignments::slots_for_date(&mut *tx, req.date).await?;
    if taken.contains(&Slot::Complete) {
        return Err(Error::CompleteNightConflict(req.date));
    }

    let has_warmup = taken.contains(&Slot::Warmup);
    let has_peaktime = taken.contains(&Slot::Peaktime);
    let actual = resolve_slot(declared, has_warmup, has_peaktime)?;

    // Re-check the resolved slot right before the write
    if taken.contains(&actual) {
        return Err(Error::SlotConflict(actual));
    }

    let assignment = Assignment {
        guid: Uuid::new_v4().to_string(),
        performer_id: req.performer_id,
        date: req.date,
        slot: actual,
        fee: pricing::fee(req.date, actual),
        notes: req.notes,
        created_by: Some(req.requested_by),
    };

    match assignments::insert(&mut *tx, &assignment).await {
        Ok(()) => {}
        // A racing request won the (date, slot) constraint; report the
        // same conflict the pre-check would have.
        Err(Error::Database(sqlx::Error::Database(db_err)))
            if db_err.message().contains("UNIQUE constraint failed") =>
        {
            return Err(Error::SlotConflict(actual));
        }
        Err(e) => return Err(e),
    }

    tx.commit().await?;

    info!(
        "Assigned performer {} to {} ({}) for fee {}",
        assignment.performer_id, assignment.date, assignment.slot, assignment.fee
    );

    Ok(assignment)
}

/// Remove an assignment
///
/// With a slot, removes exactly that (date, slot). Without one, the
/// legacy single-assignment mode applies: the date's sole assignment is
/// removed, and a date holding both halves needs the slot spelled out.
pub async fn unassign(pool: &SqlitePool, date: NaiveDate, slot: Option<Slot>) -> Result<()> {
    let mut tx = pool.begin().await?;

    let target = match slot {
        Some(s) => s,
        None => {
            let taken = assignments::slots_for_date(&mut *tx, date).await?;
            match taken.as_slice() {
                [] => return Err(Error::NotFound(format!("no assignment on {}", date))),
                [only] => *only,
                _ => {
                    return Err(Error::Validation(format!(
                        "multiple assignments on {}: slot required",
                        date
                    )))
                }
            }
        }
    };

    let deleted = assignments::delete_by_date_slot(&mut *tx, date, target).await?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("no {} assignment on {}", target, date)));
    }

    tx.commit().await?;

    info!("Removed {} assignment on {}", target, date);
    Ok(())
}

/// Declare or change a performer's availability for a date
///
/// Rejected for past dates, and frozen once the performer holds an
/// assignment on that date. Upserts otherwise: one row per
/// (performer, date). An existing assignment is never invalidated by a
/// later availability change; this guard only blocks the change itself.
pub async fn set_availability(pool: &SqlitePool, change: AvailabilityChange) -> Result<Availability> {
    if change.date < change.today {
        return Err(Error::PastDate(change.date));
    }

    if change.willing && change.slot.is_none() {
        return Err(Error::Validation("a willing declaration needs a slot".to_string()));
    }

    let mut tx = pool.begin().await?;

    if assignments::exists_for_performer_date(&mut *tx, &change.performer_id, change.date).await? {
        return Err(Error::Validation(format!(
            "already assigned on {}: availability is locked",
            change.date
        )));
    }

    let avail = Availability {
        guid: Uuid::new_v4().to_string(),
        performer_id: change.performer_id,
        date: change.date,
        willing: change.willing,
        // Not-willing declarations carry no slot
        slot: if change.willing { change.slot } else { None },
        notes: change.notes,
    };

    availability::upsert(&mut *tx, &avail).await?;

    // An upsert into an existing row keeps that row's guid; return what
    // is actually stored.
    let stored = availability::get(&mut *tx, &avail.performer_id, avail.date)
        .await?
        .ok_or_else(|| Error::Internal("availability row missing after upsert".to_string()))?;

    tx.commit().await?;

    Ok(stored)
}
