//! Assignment database queries

use crate::db::models::{Assignment, AssignmentWithPerformer};
use crate::slot::Slot;
use crate::{Error, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::{Row, SqlitePool};

fn assignment_from_row(row: &SqliteRow) -> Result<Assignment> {
    let slot_raw: String = row.get("slot");
    let slot = Slot::parse(&slot_raw)
        .ok_or_else(|| Error::Internal(format!("Unknown slot in assignment: {}", slot_raw)))?;

    Ok(Assignment {
        guid: row.get("guid"),
        performer_id: row.get("performer_id"),
        date: row.get("date"),
        slot,
        fee: row.get("fee"),
        notes: row.get("notes"),
        created_by: row.get("created_by"),
    })
}

fn with_performer_from_row(row: &SqliteRow) -> Result<AssignmentWithPerformer> {
    Ok(AssignmentWithPerformer {
        assignment: assignment_from_row(row)?,
        dj_name: row.get("dj_name"),
        email: row.get("email"),
    })
}

/// Insert an assignment row
///
/// The UNIQUE (date, slot) violation is left for the caller to translate;
/// the resolver reports it as a slot conflict for the losing racer.
pub async fn insert(ex: impl SqliteExecutor<'_>, assignment: &Assignment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO assignments (guid, performer_id, date, slot, fee, notes, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&assignment.guid)
    .bind(&assignment.performer_id)
    .bind(assignment.date)
    .bind(assignment.slot.as_str())
    .bind(assignment.fee)
    .bind(&assignment.notes)
    .bind(&assignment.created_by)
    .execute(ex)
    .await?;

    Ok(())
}

/// Occupied slots for one date
pub async fn slots_for_date(ex: impl SqliteExecutor<'_>, date: NaiveDate) -> Result<Vec<Slot>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT slot FROM assignments WHERE date = ?")
        .bind(date)
        .fetch_all(ex)
        .await?;

    rows.iter()
        .map(|(raw,)| {
            Slot::parse(raw)
                .ok_or_else(|| Error::Internal(format!("Unknown slot in assignment: {}", raw)))
        })
        .collect()
}

/// All assignments for one date
pub async fn for_date(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<Assignment>> {
    let rows = sqlx::query("SELECT * FROM assignments WHERE date = ? ORDER BY slot")
        .bind(date)
        .fetch_all(pool)
        .await?;

    rows.iter().map(assignment_from_row).collect()
}

/// Assignments for one date joined with performer identity
pub async fn for_date_with_performers(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<AssignmentWithPerformer>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, p.dj_name, p.email
        FROM assignments a
        JOIN performers p ON p.guid = a.performer_id
        WHERE a.date = ?
        ORDER BY a.slot
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    rows.iter().map(with_performer_from_row).collect()
}

/// Whether the performer already holds an assignment on the date
pub async fn exists_for_performer_date(
    ex: impl SqliteExecutor<'_>,
    performer_id: &str,
    date: NaiveDate,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM assignments WHERE performer_id = ? AND date = ?)",
    )
    .bind(performer_id)
    .bind(date)
    .fetch_one(ex)
    .await?;

    Ok(exists)
}

/// Assignments over a date range (inclusive), date order
pub async fn in_range(pool: &SqlitePool, from: NaiveDate, to: NaiveDate) -> Result<Vec<Assignment>> {
    let rows = sqlx::query("SELECT * FROM assignments WHERE date BETWEEN ? AND ? ORDER BY date, slot")
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

    rows.iter().map(assignment_from_row).collect()
}

/// Assignments over a date range joined with performer identity
///
/// Ordered by date then slot; this is the report boundary's input.
pub async fn in_range_with_performers(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AssignmentWithPerformer>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, p.dj_name, p.email
        FROM assignments a
        JOIN performers p ON p.guid = a.performer_id
        WHERE a.date BETWEEN ? AND ?
        ORDER BY a.date, a.slot
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    rows.iter().map(with_performer_from_row).collect()
}

/// Delete the assignment for (date, slot); returns rows removed
pub async fn delete_by_date_slot(
    ex: impl SqliteExecutor<'_>,
    date: NaiveDate,
    slot: Slot,
) -> Result<u64> {
    let deleted = sqlx::query("DELETE FROM assignments WHERE date = ? AND slot = ?")
        .bind(date)
        .bind(slot.as_str())
        .execute(ex)
        .await?
        .rows_affected();

    Ok(deleted)
}
