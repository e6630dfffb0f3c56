//! Database initialization
//!
//! Creates the database on first run, applies the schema idempotently,
//! then hands over to the versioned migrations. The uniqueness
//! constraints declared here are the source of truth for assignment slot
//! exclusivity; the resolver's checks are a pre-check optimization.

use crate::config::AdminBootstrap;
use crate::db::models::PerformerStatus;
use crate::db::performers::{self, NewPerformer};
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Options apply to every pooled connection: foreign keys so performer
    // removal cascades, WAL so the projector reads while the resolver
    // writes, and a busy timeout instead of immediate lock errors.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    // Versioned migrations for databases predating the three-slot scheme
    crate::db::migrations::run_migrations(&pool).await?;

    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_performers_table(pool).await?;
    create_availabilities_table(pool).await?;
    create_assignments_table(pool).await?;
    create_settings_table(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_performers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS performers (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            dj_name TEXT NOT NULL,
            phone TEXT,
            is_admin INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'active', 'inactive')),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the availabilities table
///
/// One row per (performer, date), upserted in place.
async fn create_availabilities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availabilities (
            guid TEXT PRIMARY KEY,
            performer_id TEXT NOT NULL REFERENCES performers(guid) ON DELETE CASCADE,
            date TEXT NOT NULL,
            willing INTEGER NOT NULL DEFAULT 1,
            slot TEXT CHECK (slot IS NULL OR slot IN ('warmup', 'peaktime', 'complete')),
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (performer_id, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_availabilities_date ON availabilities(date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the assignments table
///
/// UNIQUE (date, slot) makes the storage layer the arbiter between racing
/// assignment requests; a constraint violation at insert is reported as a
/// slot conflict, never surfaced raw.
async fn create_assignments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assignments (
            guid TEXT PRIMARY KEY,
            performer_id TEXT NOT NULL REFERENCES performers(guid) ON DELETE CASCADE,
            date TEXT NOT NULL,
            slot TEXT NOT NULL CHECK (slot IN ('warmup', 'peaktime', 'complete')),
            fee INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_by TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (date, slot)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assignments_date ON assignments(date)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist with default values, and resets
/// NULL values back to defaults.
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Notification settings: reminder lead times (days ahead) and the
    // forward-looking window scanned for uncovered show nights.
    ensure_setting(pool, "reminder_days", "[7, 1]").await?;
    ensure_setting(pool, "alert_window_days", "14").await?;
    ensure_setting(pool, "admin_email", "admin@localhost").await?;

    // HTTP server settings
    ensure_setting(pool, "http_port", "5780").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // Use INSERT OR IGNORE to handle concurrent initialization race conditions
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;

        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

        warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
    }

    Ok(())
}

/// Create the default admin account if no performer has its username yet
///
/// Runs on every startup; a concurrent duplicate insert is tolerated.
pub async fn ensure_default_admin(pool: &SqlitePool, bootstrap: &AdminBootstrap) -> Result<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM performers WHERE username = ?)")
            .bind(&bootstrap.username)
            .fetch_one(pool)
            .await?;

    if exists {
        return Ok(());
    }

    let new = NewPerformer {
        username: bootstrap.username.clone(),
        email: bootstrap.email.clone(),
        password: bootstrap.password.clone(),
        dj_name: bootstrap.dj_name.clone(),
        phone: None,
        is_admin: true,
        status: PerformerStatus::Active,
    };

    match performers::create(pool, new).await {
        Ok(admin) => {
            info!("Created default admin account '{}'", admin.username);
            Ok(())
        }
        // Another process created it between our check and the insert
        Err(Error::DuplicateIdentity(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
