//! Calendar and conflict projection
//!
//! Read-side aggregation over availabilities and assignments. Everything
//! here runs without locks against whatever snapshot the pool serves;
//! conflicts are re-validated at write time by the resolver, so a
//! slightly stale view is acceptable.

use crate::db::models::{Assignment, AssignmentWithPerformer};
use crate::db::{assignments, availability};
use crate::resolver::resolve_slot;
use crate::slot::Slot;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One date's status in a performer's own calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Past,
    Assigned,
    Available,
    Unavailable,
}

/// One date in a performer's calendar view
#[derive(Debug, Clone, Serialize)]
pub struct PerformerDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    /// The slot this performer declared, if willing
    pub declared_slot: Option<Slot>,
    /// The slot this performer holds, if assigned
    pub assigned_slot: Option<Slot>,
}

/// One date's status in the coordinator's cross-performer calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminDayStatus {
    Assigned,
    Past,
    Multiple,
    Single,
    None,
}

/// One date in the coordinator's calendar view
///
/// Complete willingness counts toward both half-slot tallies.
#[derive(Debug, Clone, Serialize)]
pub struct AdminDay {
    pub date: NaiveDate,
    pub warmup_willing: i64,
    pub peaktime_willing: i64,
    pub complete_willing: i64,
    pub assignments: Vec<Assignment>,
    pub status: AdminDayStatus,
}

/// A date with several willing performers and no assignment yet
#[derive(Debug, Clone, Serialize)]
pub struct ConflictDay {
    pub date: NaiveDate,
    pub willing_count: i64,
    pub performers: Vec<String>,
}

/// A performer still eligible for an open slot on a date
///
/// `would_assign` is the slot they would actually receive, after any
/// downgrade of a complete declaration to the remaining open half.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub performer_id: String,
    pub dj_name: String,
    pub declared: Slot,
    pub would_assign: Slot,
}

/// Detail view for one date: what's booked and who could still fill it
#[derive(Debug, Clone, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub assignments: Vec<AssignmentWithPerformer>,
    pub candidates: Vec<Candidate>,
}

/// First and last date of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Validation(format!("invalid month {}-{}", year, month)))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::Validation(format!("invalid month {}-{}", year, month)))?;
    let last = next_month.pred_opt().unwrap_or(first);
    Ok((first, last))
}

fn month_dates(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut d = first;
    while d <= last {
        dates.push(d);
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    dates
}

/// One performer's calendar for a month
pub async fn performer_month(
    pool: &SqlitePool,
    performer_id: &str,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<Vec<PerformerDay>> {
    let (first, last) = month_bounds(year, month)?;

    let availabilities = availability::for_performer_range(pool, performer_id, first, last).await?;
    let declared: HashMap<NaiveDate, Option<Slot>> = availabilities
        .iter()
        .filter(|a| a.willing)
        .map(|a| (a.date, a.slot))
        .collect();

    let own_assignments: HashMap<NaiveDate, Slot> = assignments::in_range(pool, first, last)
        .await?
        .into_iter()
        .filter(|a| a.performer_id == performer_id)
        .map(|a| (a.date, a.slot))
        .collect();

    let days = month_dates(first, last)
        .into_iter()
        .map(|date| {
            let declared_slot = declared.get(&date).copied().flatten();
            let assigned_slot = own_assignments.get(&date).copied();
            let status = if date < today {
                DayStatus::Past
            } else if assigned_slot.is_some() {
                DayStatus::Assigned
            } else if declared_slot.is_some() {
                DayStatus::Available
            } else {
                DayStatus::Unavailable
            };
            PerformerDay {
                date,
                status,
                declared_slot,
                assigned_slot,
            }
        })
        .collect();

    Ok(days)
}

/// The coordinator's cross-performer calendar for a month
pub async fn admin_month(
    pool: &SqlitePool,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<Vec<AdminDay>> {
    let (first, last) = month_bounds(year, month)?;

    let willing = availability::willing_in_range(pool, first, last).await?;
    let mut willing_by_date: BTreeMap<NaiveDate, Vec<(String, Slot)>> = BTreeMap::new();
    for (date, performer_id, slot) in willing {
        willing_by_date.entry(date).or_default().push((performer_id, slot));
    }

    let mut assigned_by_date: BTreeMap<NaiveDate, Vec<Assignment>> = BTreeMap::new();
    for a in assignments::in_range(pool, first, last).await? {
        assigned_by_date.entry(a.date).or_default().push(a);
    }

    let days = month_dates(first, last)
        .into_iter()
        .map(|date| {
            let willing = willing_by_date.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            let day_assignments = assigned_by_date.remove(&date).unwrap_or_default();

            let warmup_willing =
                willing.iter().filter(|(_, s)| s.covers(Slot::Warmup)).count() as i64;
            let peaktime_willing =
                willing.iter().filter(|(_, s)| s.covers(Slot::Peaktime)).count() as i64;
            let complete_willing =
                willing.iter().filter(|(_, s)| *s == Slot::Complete).count() as i64;

            let distinct: HashSet<&String> = willing.iter().map(|(p, _)| p).collect();
            let status = if !day_assignments.is_empty() {
                AdminDayStatus::Assigned
            } else if date < today {
                AdminDayStatus::Past
            } else if distinct.len() > 1 {
                AdminDayStatus::Multiple
            } else if distinct.len() == 1 {
                AdminDayStatus::Single
            } else {
                AdminDayStatus::None
            };

            AdminDay {
                date,
                warmup_willing,
                peaktime_willing,
                complete_willing,
                assignments: day_assignments,
                status,
            }
        })
        .collect();

    Ok(days)
}

/// Dates in [from, to] with more than one willing performer and no
/// assignment yet, ascending
pub async fn conflicts(pool: &SqlitePool, from: NaiveDate, to: NaiveDate) -> Result<Vec<ConflictDay>> {
    let willing = availability::willing_in_range(pool, from, to).await?;
    let mut by_date: BTreeMap<NaiveDate, HashSet<String>> = BTreeMap::new();
    for (date, performer_id, _) in willing {
        by_date.entry(date).or_default().insert(performer_id);
    }

    let assigned_dates: HashSet<NaiveDate> = assignments::in_range(pool, from, to)
        .await?
        .into_iter()
        .map(|a| a.date)
        .collect();

    let mut out = Vec::new();
    for (date, performer_ids) in by_date {
        if performer_ids.len() > 1 && !assigned_dates.contains(&date) {
            let names: Vec<String> = availability::willing_for_date(pool, date)
                .await?
                .into_iter()
                .map(|w| w.dj_name)
                .collect();
            out.push(ConflictDay {
                date,
                willing_count: performer_ids.len() as i64,
                performers: names,
            });
        }
    }
    Ok(out)
}

/// Detail for one date: current assignments plus downgrade-aware candidates
///
/// A complete assignment closes the date; otherwise each willing,
/// not-yet-assigned performer is offered with the slot they would actually
/// get, and dropped entirely when nothing compatible is open.
pub async fn day_detail(pool: &SqlitePool, date: NaiveDate) -> Result<DayDetail> {
    let day_assignments = assignments::for_date_with_performers(pool, date).await?;

    let taken: Vec<Slot> = day_assignments.iter().map(|a| a.assignment.slot).collect();
    if taken.contains(&Slot::Complete) {
        return Ok(DayDetail {
            date,
            assignments: day_assignments,
            candidates: Vec::new(),
        });
    }

    let has_warmup = taken.contains(&Slot::Warmup);
    let has_peaktime = taken.contains(&Slot::Peaktime);
    let assigned_performers: HashSet<String> = day_assignments
        .iter()
        .map(|a| a.assignment.performer_id.clone())
        .collect();

    let mut candidates = Vec::new();
    for w in availability::willing_for_date(pool, date).await? {
        if assigned_performers.contains(&w.performer_id) {
            continue;
        }
        if let Ok(would_assign) = resolve_slot(w.slot, has_warmup, has_peaktime) {
            candidates.push(Candidate {
                performer_id: w.performer_id,
                dj_name: w.dj_name,
                declared: w.slot,
                would_assign,
            });
        }
    }

    Ok(DayDetail {
        date,
        assignments: day_assignments,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_cover_whole_month() {
        let (first, last) = month_bounds(2026, 3).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(month_dates(first, last).len(), 31);
    }

    #[test]
    fn month_bounds_handle_december() {
        let (first, last) = month_bounds(2026, 12).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn month_bounds_reject_bad_month() {
        assert!(month_bounds(2026, 13).is_err());
        assert!(month_bounds(2026, 0).is_err());
    }

    #[test]
    fn february_has_28_days_in_2026() {
        let (first, last) = month_bounds(2026, 2).unwrap();
        assert_eq!(month_dates(first, last).len(), 28);
    }
}
