//! Calendar, conflict and day-detail endpoints
//!
//! Thin wrappers over the projector; responses are plain data for the
//! front end to render.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use djp_common::projector::{self, AdminDay, ConflictDay, DayDetail, PerformerDay};
use djp_common::time;
use serde::{Deserialize, Serialize};

use crate::api::{parse_date, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PerformerQuery {
    pub performer_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct PerformerCalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<PerformerDay>,
}

#[derive(Debug, Serialize)]
pub struct AdminCalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<AdminDay>,
}

/// GET /api/calendar/:year/:month?performer_id=...
///
/// One performer's month grid.
pub async fn performer_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<PerformerQuery>,
) -> ApiResult<Json<PerformerCalendarResponse>> {
    let days =
        projector::performer_month(&state.db, &query.performer_id, year, month, time::today())
            .await?;
    Ok(Json(PerformerCalendarResponse { year, month, days }))
}

/// GET /api/admin/calendar/:year/:month
///
/// The coordinator's cross-performer month grid with willing tallies.
pub async fn admin_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<AdminCalendarResponse>> {
    let days = projector::admin_month(&state.db, year, month, time::today()).await?;
    Ok(Json(AdminCalendarResponse { year, month, days }))
}

/// GET /api/admin/conflicts?from=...&to=...
///
/// Dates with several willing performers and no assignment, ascending.
pub async fn conflicts(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<ConflictDay>>> {
    let from = parse_date(&query.from)?;
    let to = parse_date(&query.to)?;
    Ok(Json(projector::conflicts(&state.db, from, to).await?))
}

/// GET /api/admin/day/:date
///
/// Assignments plus downgrade-aware candidates for one date.
pub async fn day_detail(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<DayDetail>> {
    let date = parse_date(&date)?;
    Ok(Json(projector::day_detail(&state.db, date).await?))
}
