//! Integration tests for the assignment resolver
//!
//! Exercises the full allocation path against an in-memory database:
//! downgrades, conflicts, past-date guards and the unassign paths.

use chrono::NaiveDate;
use djp_common::db::models::PerformerStatus;
use djp_common::db::{assignments, performers};
use djp_common::resolver::{self, AssignRequest, AvailabilityChange};
use djp_common::{Error, Slot};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2026-03-01 is a Sunday; 03-05 is a Thursday, 03-06 a Friday
fn today() -> NaiveDate {
    date(2026, 3, 1)
}

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    djp_common::db::init_schema(&pool).await.unwrap();
    pool
}

async fn add_performer(pool: &SqlitePool, username: &str) -> String {
    performers::create(
        pool,
        performers::NewPerformer {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "s3cret".to_string(),
            dj_name: username.to_uppercase(),
            phone: None,
            is_admin: false,
            status: PerformerStatus::Active,
        },
    )
    .await
    .unwrap()
    .guid
}

async fn declare(pool: &SqlitePool, performer_id: &str, on: NaiveDate, slot: Slot) {
    resolver::set_availability(
        pool,
        AvailabilityChange {
            performer_id: performer_id.to_string(),
            date: on,
            willing: true,
            slot: Some(slot),
            notes: None,
            today: today(),
        },
    )
    .await
    .unwrap();
}

fn request(performer_id: &str, on: NaiveDate) -> AssignRequest {
    AssignRequest {
        date: on,
        performer_id: performer_id.to_string(),
        requested_by: "admin".to_string(),
        notes: None,
        today: today(),
    }
}

#[tokio::test]
async fn complete_assignment_takes_the_whole_thursday() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let thu = date(2026, 3, 5);

    declare(&pool, &a, thu, Slot::Complete).await;
    let assignment = resolver::try_assign(&pool, request(&a, thu)).await.unwrap();

    assert_eq!(assignment.slot, Slot::Complete);
    assert_eq!(assignment.fee, 120);

    // Any further attempt on the date is rejected, whatever was declared
    let b = add_performer(&pool, "bob").await;
    declare(&pool, &b, thu, Slot::Warmup).await;
    let err = resolver::try_assign(&pool, request(&b, thu)).await.unwrap_err();
    assert!(matches!(err, Error::CompleteNightConflict(_)));
}

#[tokio::test]
async fn friday_fills_both_halves_then_has_no_room() {
    let pool = test_pool().await;
    let b = add_performer(&pool, "bob").await;
    let c = add_performer(&pool, "carol").await;
    let d = add_performer(&pool, "dave").await;
    let fri = date(2026, 3, 6);

    declare(&pool, &b, fri, Slot::Warmup).await;
    declare(&pool, &c, fri, Slot::Peaktime).await;
    declare(&pool, &d, fri, Slot::Complete).await;

    let warmup = resolver::try_assign(&pool, request(&b, fri)).await.unwrap();
    assert_eq!(warmup.slot, Slot::Warmup);
    assert_eq!(warmup.fee, 50);

    let peaktime = resolver::try_assign(&pool, request(&c, fri)).await.unwrap();
    assert_eq!(peaktime.slot, Slot::Peaktime);
    assert_eq!(peaktime.fee, 150);

    let err = resolver::try_assign(&pool, request(&d, fri)).await.unwrap_err();
    assert!(matches!(err, Error::SlotConflict(_)));
}

#[tokio::test]
async fn complete_declaration_downgrades_to_open_half() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let x = add_performer(&pool, "xavier").await;

    // Warmup taken: the complete declarer gets peaktime
    let thu = date(2026, 3, 5);
    declare(&pool, &a, thu, Slot::Warmup).await;
    declare(&pool, &x, thu, Slot::Complete).await;
    resolver::try_assign(&pool, request(&a, thu)).await.unwrap();
    let downgraded = resolver::try_assign(&pool, request(&x, thu)).await.unwrap();
    assert_eq!(downgraded.slot, Slot::Peaktime);
    assert_eq!(downgraded.fee, 80);

    // Peaktime taken: symmetric downgrade to warmup
    let fri = date(2026, 3, 6);
    declare(&pool, &a, fri, Slot::Peaktime).await;
    declare(&pool, &x, fri, Slot::Complete).await;
    resolver::try_assign(&pool, request(&a, fri)).await.unwrap();
    let downgraded = resolver::try_assign(&pool, request(&x, fri)).await.unwrap();
    assert_eq!(downgraded.slot, Slot::Warmup);
    assert_eq!(downgraded.fee, 50);
}

#[tokio::test]
async fn complete_request_blocked_by_single_occupied_half_it_would_need() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let b = add_performer(&pool, "bob").await;
    let thu = date(2026, 3, 5);

    declare(&pool, &a, thu, Slot::Warmup).await;
    declare(&pool, &b, thu, Slot::Warmup).await;
    resolver::try_assign(&pool, request(&a, thu)).await.unwrap();

    // Same half already taken
    let err = resolver::try_assign(&pool, request(&b, thu)).await.unwrap_err();
    assert!(matches!(err, Error::SlotConflict(Slot::Warmup)));
}

#[tokio::test]
async fn past_dates_are_rejected_everywhere() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let yesterday = date(2026, 2, 28);

    let err = resolver::try_assign(&pool, request(&a, yesterday)).await.unwrap_err();
    assert!(matches!(err, Error::PastDate(_)));

    let err = resolver::set_availability(
        &pool,
        AvailabilityChange {
            performer_id: a.clone(),
            date: yesterday,
            willing: true,
            slot: Some(Slot::Complete),
            notes: None,
            today: today(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::PastDate(_)));
}

#[tokio::test]
async fn assignment_requires_a_willing_declaration() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let thu = date(2026, 3, 5);

    // No declaration at all
    let err = resolver::try_assign(&pool, request(&a, thu)).await.unwrap_err();
    assert!(matches!(err, Error::NotAvailable(_)));

    // An explicit not-willing declaration is no better
    resolver::set_availability(
        &pool,
        AvailabilityChange {
            performer_id: a.clone(),
            date: thu,
            willing: false,
            slot: None,
            notes: None,
            today: today(),
        },
    )
    .await
    .unwrap();
    let err = resolver::try_assign(&pool, request(&a, thu)).await.unwrap_err();
    assert!(matches!(err, Error::NotAvailable(_)));
}

#[tokio::test]
async fn availability_upserts_in_place() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let thu = date(2026, 3, 5);

    declare(&pool, &a, thu, Slot::Warmup).await;
    declare(&pool, &a, thu, Slot::Complete).await;

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM availabilities WHERE performer_id = ? AND date = ?",
    )
    .bind(&a)
    .bind(thu)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);

    let slot: String = sqlx::query_scalar(
        "SELECT slot FROM availabilities WHERE performer_id = ? AND date = ?",
    )
    .bind(&a)
    .bind(thu)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(slot, "complete");
}

#[tokio::test]
async fn availability_is_frozen_once_assigned() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let thu = date(2026, 3, 5);

    declare(&pool, &a, thu, Slot::Complete).await;
    resolver::try_assign(&pool, request(&a, thu)).await.unwrap();

    let err = resolver::set_availability(
        &pool,
        AvailabilityChange {
            performer_id: a.clone(),
            date: thu,
            willing: false,
            slot: None,
            notes: None,
            today: today(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn unassign_with_and_without_slot() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let b = add_performer(&pool, "bob").await;
    let thu = date(2026, 3, 5);
    let fri = date(2026, 3, 6);

    // Nothing to remove yet
    let err = resolver::unassign(&pool, thu, None).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // Sole assignment removed without naming the slot (legacy mode)
    declare(&pool, &a, thu, Slot::Complete).await;
    resolver::try_assign(&pool, request(&a, thu)).await.unwrap();
    resolver::unassign(&pool, thu, None).await.unwrap();
    assert!(assignments::for_date(&pool, thu).await.unwrap().is_empty());

    // Two halves booked: the slot must be spelled out
    declare(&pool, &a, fri, Slot::Warmup).await;
    declare(&pool, &b, fri, Slot::Peaktime).await;
    resolver::try_assign(&pool, request(&a, fri)).await.unwrap();
    resolver::try_assign(&pool, request(&b, fri)).await.unwrap();

    let err = resolver::unassign(&pool, fri, None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    resolver::unassign(&pool, fri, Some(Slot::Warmup)).await.unwrap();
    let remaining = assignments::for_date(&pool, fri).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].slot, Slot::Peaktime);

    // Removing the same slot again is NotFound
    let err = resolver::unassign(&pool, fri, Some(Slot::Warmup)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn unique_constraint_backstops_the_resolver() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let thu = date(2026, 3, 5);

    declare(&pool, &a, thu, Slot::Warmup).await;

    // Bypass the resolver to simulate a racer that committed first
    sqlx::query(
        "INSERT INTO assignments (guid, performer_id, date, slot, fee) VALUES ('racer', ?, ?, 'warmup', 40)",
    )
    .bind(&a)
    .bind(thu)
    .execute(&pool)
    .await
    .unwrap();

    let b = add_performer(&pool, "bob").await;
    declare(&pool, &b, thu, Slot::Warmup).await;
    let err = resolver::try_assign(&pool, request(&b, thu)).await.unwrap_err();
    assert!(matches!(err, Error::SlotConflict(Slot::Warmup)));
}

#[tokio::test]
async fn mutual_exclusion_between_complete_and_halves() {
    let pool = test_pool().await;
    let a = add_performer(&pool, "alice").await;
    let b = add_performer(&pool, "bob").await;
    let sat = date(2026, 3, 7);

    // A half-slot assignment blocks a later complete request
    declare(&pool, &a, sat, Slot::Peaktime).await;
    resolver::try_assign(&pool, request(&a, sat)).await.unwrap();

    declare(&pool, &b, sat, Slot::Complete).await;
    // Complete downgrades to warmup here; but never coexists with complete
    let downgraded = resolver::try_assign(&pool, request(&b, sat)).await.unwrap();
    assert_eq!(downgraded.slot, Slot::Warmup);

    let slots: Vec<Slot> = assignments::for_date(&pool, sat)
        .await
        .unwrap()
        .iter()
        .map(|x| x.slot)
        .collect();
    assert!(!slots.contains(&Slot::Complete));
    assert_eq!(slots.len(), 2);
}
