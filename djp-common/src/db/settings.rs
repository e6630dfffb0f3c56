//! Settings table queries
//!
//! Typed accessors over the key-value settings table. Every accessor has
//! a compiled default so a missing or unparseable value never fails a
//! request path.

use crate::Result;
use sqlx::SqlitePool;
use tracing::warn;

/// Default reminder lead times in days
pub const DEFAULT_REMINDER_DAYS: [i64; 2] = [7, 1];

/// Default forward-looking window for admin coverage alerts
pub const DEFAULT_ALERT_WINDOW_DAYS: i64 = 14;

/// Get a raw setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Set a setting value (insert or replace)
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Reminder lead times in days, most distant first
///
/// Stored as a JSON list (e.g. `[7, 1]`).
pub async fn reminder_days(pool: &SqlitePool) -> Result<Vec<i64>> {
    match get_setting(pool, "reminder_days").await? {
        Some(raw) => match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(days) if !days.is_empty() => Ok(days),
            _ => {
                warn!("Setting 'reminder_days' is malformed ({}), using default", raw);
                Ok(DEFAULT_REMINDER_DAYS.to_vec())
            }
        },
        None => Ok(DEFAULT_REMINDER_DAYS.to_vec()),
    }
}

/// Forward-looking window (days) scanned for uncovered show nights
pub async fn alert_window_days(pool: &SqlitePool) -> Result<i64> {
    match get_setting(pool, "alert_window_days").await? {
        Some(raw) => match raw.parse::<i64>() {
            Ok(days) if days > 0 => Ok(days),
            _ => {
                warn!("Setting 'alert_window_days' is malformed ({}), using default", raw);
                Ok(DEFAULT_ALERT_WINDOW_DAYS)
            }
        },
        None => Ok(DEFAULT_ALERT_WINDOW_DAYS),
    }
}

/// Coordinator address for coverage alerts
pub async fn admin_email(pool: &SqlitePool) -> Result<String> {
    Ok(get_setting(pool, "admin_email")
        .await?
        .unwrap_or_else(|| "admin@localhost".to_string()))
}
