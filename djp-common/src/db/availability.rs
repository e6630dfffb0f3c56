//! Availability database queries

use crate::db::models::{Availability, PerformerStatus};
use crate::slot::Slot;
use crate::{Error, Result};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteExecutor, SqliteRow};
use sqlx::{Row, SqlitePool};

/// A willing performer on a given date, as the admin views see them
#[derive(Debug, Clone)]
pub struct WillingPerformer {
    pub performer_id: String,
    pub dj_name: String,
    pub status: PerformerStatus,
    pub slot: Slot,
}

fn availability_from_row(row: &SqliteRow) -> Result<Availability> {
    let slot = match row.get::<Option<String>, _>("slot") {
        Some(raw) => Some(
            Slot::parse(&raw)
                .ok_or_else(|| Error::Internal(format!("Unknown slot in availability: {}", raw)))?,
        ),
        None => None,
    };

    Ok(Availability {
        guid: row.get("guid"),
        performer_id: row.get("performer_id"),
        date: row.get("date"),
        willing: row.get::<i64, _>("willing") != 0,
        slot,
        notes: row.get("notes"),
    })
}

/// Insert or update the declaration for (performer, date)
///
/// The UNIQUE (performer_id, date) constraint gives upsert semantics: a
/// second declaration for the same date updates the first in place.
pub async fn upsert(ex: impl SqliteExecutor<'_>, avail: &Availability) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO availabilities (guid, performer_id, date, willing, slot, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (performer_id, date)
        DO UPDATE SET willing = excluded.willing,
                      slot = excluded.slot,
                      notes = excluded.notes,
                      updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&avail.guid)
    .bind(&avail.performer_id)
    .bind(avail.date)
    .bind(avail.willing as i64)
    .bind(avail.slot.map(|s| s.as_str()))
    .bind(&avail.notes)
    .execute(ex)
    .await?;

    Ok(())
}

/// Get the declaration for (performer, date), if any
pub async fn get(
    ex: impl SqliteExecutor<'_>,
    performer_id: &str,
    date: NaiveDate,
) -> Result<Option<Availability>> {
    let row = sqlx::query("SELECT * FROM availabilities WHERE performer_id = ? AND date = ?")
        .bind(performer_id)
        .bind(date)
        .fetch_optional(ex)
        .await?;

    row.as_ref().map(availability_from_row).transpose()
}

/// All willing performers for one date, joined with their identity
///
/// Inactive performers are excluded; their old declarations stay in the
/// table but no longer surface as candidates.
pub async fn willing_for_date(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<WillingPerformer>> {
    let rows = sqlx::query(
        r#"
        SELECT a.performer_id, a.slot, p.dj_name, p.status
        FROM availabilities a
        JOIN performers p ON p.guid = a.performer_id
        WHERE a.date = ? AND a.willing = 1 AND a.slot IS NOT NULL
          AND p.status != 'inactive'
        ORDER BY p.dj_name
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let slot_raw: String = row.get("slot");
        let status_raw: String = row.get("status");
        out.push(WillingPerformer {
            performer_id: row.get("performer_id"),
            dj_name: row.get("dj_name"),
            status: PerformerStatus::parse(&status_raw)
                .ok_or_else(|| Error::Internal(format!("Unknown performer status: {}", status_raw)))?,
            slot: Slot::parse(&slot_raw)
                .ok_or_else(|| Error::Internal(format!("Unknown slot in availability: {}", slot_raw)))?,
        });
    }
    Ok(out)
}

/// One performer's declarations over a date range (inclusive)
pub async fn for_performer_range(
    pool: &SqlitePool,
    performer_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Availability>> {
    let rows = sqlx::query(
        "SELECT * FROM availabilities WHERE performer_id = ? AND date BETWEEN ? AND ? ORDER BY date",
    )
    .bind(performer_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    rows.iter().map(availability_from_row).collect()
}

/// All willing declarations over a date range: (date, performer, slot)
///
/// Feeds the admin month aggregation and the conflict scan; excludes
/// inactive performers, same as [`willing_for_date`].
pub async fn willing_in_range(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(NaiveDate, String, Slot)>> {
    let rows = sqlx::query(
        r#"
        SELECT a.date, a.performer_id, a.slot
        FROM availabilities a
        JOIN performers p ON p.guid = a.performer_id
        WHERE a.date BETWEEN ? AND ? AND a.willing = 1 AND a.slot IS NOT NULL
          AND p.status != 'inactive'
        ORDER BY a.date
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let slot_raw: String = row.get("slot");
        out.push((
            row.get("date"),
            row.get("performer_id"),
            Slot::parse(&slot_raw)
                .ok_or_else(|| Error::Internal(format!("Unknown slot in availability: {}", slot_raw)))?,
        ));
    }
    Ok(out)
}
