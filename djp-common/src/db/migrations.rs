//! Database schema migrations
//!
//! Versioned migrations tracked in the `schema_version` table, allowing
//! databases from the original single-assignment-per-date scheme to be
//! upgraded in place without data loss. All migrations are idempotent and
//! safe to re-run.

use crate::pricing;
use crate::Result;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Check whether `table` exists
async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
    )
    .bind(table)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Add a column if it is not already present (idempotent)
async fn add_column_if_missing(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    decl: &str,
) -> Result<bool> {
    let has_column: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = '{}'",
        table, column
    ))
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        return Ok(false);
    }

    match sqlx::query(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl))
        .execute(pool)
        .await
    {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
            // Another thread beat us to it - that's fine
            info!("  {} column added by concurrent thread - skipping", column);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Migration v1: Add slot and fee columns for the three-slot scheme
///
/// **Background:** availabilities and assignments originally keyed off the
/// date alone (one assignment per date, no slot, no persisted fee). This
/// migration widens legacy tables so the three-slot scheme can operate on
/// them.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add slot/fee columns for the three-slot scheme");

    if table_exists(pool, "availabilities").await? {
        if add_column_if_missing(pool, "availabilities", "slot", "TEXT").await? {
            info!("  ✓ Added slot column to availabilities table");
        }
    } else {
        info!("  Availabilities table doesn't exist yet - skipping");
    }

    if table_exists(pool, "assignments").await? {
        if add_column_if_missing(pool, "assignments", "slot", "TEXT").await? {
            info!("  ✓ Added slot column to assignments table");
        }
        if add_column_if_missing(pool, "assignments", "fee", "INTEGER").await? {
            info!("  ✓ Added fee column to assignments table");
        }
    } else {
        info!("  Assignments table doesn't exist yet - skipping");
    }

    Ok(())
}

/// Migration v2: Migrate legacy single-assignment rows to the complete slot
///
/// **Background:** under the old scheme an assignment covered the whole
/// night. Rows without a slot are explicitly migrated to 'complete' here;
/// nothing in the read path coerces NULL slots silently.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Migrate legacy rows to the complete slot");

    if table_exists(pool, "assignments").await? {
        let updated = sqlx::query("UPDATE assignments SET slot = 'complete' WHERE slot IS NULL")
            .execute(pool)
            .await?
            .rows_affected();
        if updated > 0 {
            info!("  ✓ Migrated {} legacy assignments to slot 'complete'", updated);
        }
    }

    if table_exists(pool, "availabilities").await? {
        let updated = sqlx::query(
            "UPDATE availabilities SET slot = 'complete' WHERE slot IS NULL AND willing = 1",
        )
        .execute(pool)
        .await?
        .rows_affected();
        if updated > 0 {
            info!("  ✓ Migrated {} legacy availabilities to slot 'complete'", updated);
        }
    }

    Ok(())
}

/// Migration v3: Backfill persisted fees on legacy assignments
///
/// Rows created before fees were persisted get their fee computed from the
/// current schedule. Unrecognized slot labels price at 0 by policy.
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: Backfill assignment fees");

    if !table_exists(pool, "assignments").await? {
        info!("  Assignments table doesn't exist yet - skipping");
        return Ok(());
    }

    let rows = sqlx::query(
        "SELECT guid, date, slot FROM assignments WHERE fee IS NULL OR fee = 0",
    )
    .fetch_all(pool)
    .await?;

    let mut updated = 0u64;
    for row in &rows {
        let guid: String = row.get("guid");
        let date: NaiveDate = row.get("date");
        let slot: Option<String> = row.get("slot");

        let fee = pricing::fee_for_label(date, slot.as_deref().unwrap_or(""));
        sqlx::query("UPDATE assignments SET fee = ? WHERE guid = ?")
            .bind(fee)
            .bind(&guid)
            .execute(pool)
            .await?;
        updated += 1;
    }

    if updated > 0 {
        info!("  ✓ Backfilled fees on {} assignments", updated);
    }

    Ok(())
}
