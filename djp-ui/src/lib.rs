//! djp-ui library - HTTP interface to the planning core
//!
//! Serves the JSON API the performer and coordinator front ends consume.
//! Rendering is the front end's concern; every endpoint returns plain
//! data from the projector, the resolver, or the report feed.

use axum::Router;
use djp_common::notify::NotificationMessage;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Outbound notification queue
    pub notify_tx: mpsc::Sender<NotificationMessage>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, notify_tx: mpsc::Sender<NotificationMessage>) -> Self {
        Self { db, notify_tx }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/performers", post(api::performers::register))
        .route("/api/performers", get(api::performers::roster))
        .route("/api/performers/:id/deactivate", post(api::performers::deactivate))
        .route("/api/performers/:id", delete(api::performers::remove))
        .route("/api/availability", put(api::availability::set_availability))
        .route("/api/calendar/:year/:month", get(api::calendar::performer_month))
        .route("/api/admin/calendar/:year/:month", get(api::calendar::admin_month))
        .route("/api/admin/conflicts", get(api::calendar::conflicts))
        .route("/api/admin/day/:date", get(api::calendar::day_detail))
        .route("/api/admin/report/:year/:month", get(api::report::monthly_report))
        .route("/api/assignments", post(api::assignments::create))
        .route("/api/assignments", delete(api::assignments::remove))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
