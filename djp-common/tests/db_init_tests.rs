//! Integration tests for database initialization

use djp_common::config::AdminBootstrap;
use djp_common::db::{ensure_default_admin, init_database, performers, settings};
use tempfile::tempdir;

#[tokio::test]
async fn init_creates_database_and_schema() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("djp.db");

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    // All tables exist
    for table in ["performers", "availabilities", "assignments", "settings", "schema_version"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "missing table {}", table);
    }

    // Migrations ran to completion on the fresh schema
    let version: i32 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(version >= 3);

    // Default settings are in place
    assert_eq!(settings::reminder_days(&pool).await.unwrap(), vec![7, 1]);
    assert_eq!(settings::alert_window_days(&pool).await.unwrap(), 14);
}

#[tokio::test]
async fn init_is_idempotent_across_reopens() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("djp.db");

    let pool = init_database(&db_path).await.unwrap();
    let bootstrap = AdminBootstrap {
        username: "admin".to_string(),
        password: "Secret1!".to_string(),
        email: "admin@example.com".to_string(),
        dj_name: "Coordinator".to_string(),
    };
    ensure_default_admin(&pool, &bootstrap).await.unwrap();
    drop(pool);

    // Reopening an existing database must not duplicate anything
    let pool = init_database(&db_path).await.unwrap();
    ensure_default_admin(&pool, &bootstrap).await.unwrap();

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performers WHERE username = 'admin'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 1);

    let roster = performers::list_with_counts(&pool).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert!(roster[0].performer.is_admin);
}

#[tokio::test]
async fn foreign_keys_are_enforced() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("djp.db");
    let pool = init_database(&db_path).await.unwrap();

    // An availability for a performer that does not exist must be refused
    let result = sqlx::query(
        "INSERT INTO availabilities (guid, performer_id, date, willing, slot) VALUES ('x', 'ghost', '2026-03-05', 1, 'complete')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}
