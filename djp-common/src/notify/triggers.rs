//! Notification trigger predicates
//!
//! Pure queries over current state: what is due today, nothing about how
//! it gets delivered. The caller (the daily cron run) is responsible for
//! not invoking them twice on the same day; there is no sent-memory here.

use crate::db::models::AssignmentWithPerformer;
use crate::db::{assignments, availability};
use crate::slot::Slot;
use crate::time::is_show_night;
use crate::Result;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

/// A reminder that is due today for an upcoming assignment
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub assignment: AssignmentWithPerformer,
    pub days_left: i64,
}

/// An uncovered show night the coordinator should hear about
#[derive(Debug, Clone, Serialize)]
pub struct CoverageAlert {
    pub date: NaiveDate,
    /// Slots that are neither assigned nor declared for by anyone
    pub missing: Vec<Slot>,
    /// Total willing performers on the date, whatever their slot
    pub available_count: i64,
}

/// Reminders due today
///
/// For each lead time, the assignments exactly that many days ahead, but
/// only when the target date is a show night (Thursday to Saturday).
/// Assignments on other weekdays are skipped on purpose: the venue only
/// reminds for its own nights.
pub async fn due_reminders(
    pool: &SqlitePool,
    today: NaiveDate,
    lead_days: &[i64],
) -> Result<Vec<DueReminder>> {
    let mut due = Vec::new();

    for &days_left in lead_days {
        let target = match today.checked_add_days(Days::new(days_left as u64)) {
            Some(d) => d,
            None => continue,
        };

        if !is_show_night(target) {
            debug!("Skipping reminders for {}: not a show night", target);
            continue;
        }

        for assignment in assignments::for_date_with_performers(pool, target).await? {
            due.push(DueReminder {
                assignment,
                days_left,
            });
        }
    }

    Ok(due)
}

/// Coverage alerts due today
///
/// Scans the show nights in the next `window_days` days. A date needs no
/// alert when a complete assignment covers it, or both halves are
/// individually assigned. Otherwise each still-open half is checked
/// against willing declarations (complete willingness counts toward both
/// halves); a half nobody can fill raises an alert.
pub async fn due_admin_alerts(
    pool: &SqlitePool,
    today: NaiveDate,
    window_days: i64,
) -> Result<Vec<CoverageAlert>> {
    let mut alerts = Vec::new();

    for offset in 0..=window_days.max(0) {
        let date = match today.checked_add_days(Days::new(offset as u64)) {
            Some(d) => d,
            None => break,
        };

        if !is_show_night(date) {
            continue;
        }

        let taken = assignments::slots_for_date(pool, date).await?;
        if taken.contains(&Slot::Complete) {
            continue;
        }
        let has_warmup = taken.contains(&Slot::Warmup);
        let has_peaktime = taken.contains(&Slot::Peaktime);
        if has_warmup && has_peaktime {
            continue;
        }

        let willing = availability::willing_for_date(pool, date).await?;
        let warmup_count = willing.iter().filter(|w| w.slot.covers(Slot::Warmup)).count();
        let peaktime_count = willing.iter().filter(|w| w.slot.covers(Slot::Peaktime)).count();

        let mut missing = Vec::new();
        if !has_warmup && warmup_count == 0 {
            missing.push(Slot::Warmup);
        }
        if !has_peaktime && peaktime_count == 0 {
            missing.push(Slot::Peaktime);
        }

        if !missing.is_empty() {
            alerts.push(CoverageAlert {
                date,
                missing,
                available_count: willing.len() as i64,
            });
        }
    }

    Ok(alerts)
}
