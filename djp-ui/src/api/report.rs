//! Monthly report feed
//!
//! Ordered assignment rows for a month; layout belongs to whatever
//! renders the summary, not here.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use djp_common::db::assignments;
use djp_common::projector::month_bounds;
use djp_common::Slot;
use serde::Serialize;

use crate::api::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub slot: Slot,
    pub dj_name: String,
    pub fee: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<ReportRow>,
    pub total_fees: i64,
}

/// GET /api/admin/report/:year/:month
///
/// Assignment rows ordered by date then slot, with the month's fee total.
pub async fn monthly_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<ReportResponse>> {
    let (first, last) = month_bounds(year, month)?;

    let rows: Vec<ReportRow> = assignments::in_range_with_performers(&state.db, first, last)
        .await?
        .into_iter()
        .map(|a| ReportRow {
            date: a.assignment.date,
            slot: a.assignment.slot,
            dj_name: a.dj_name,
            fee: a.assignment.fee,
            notes: a.assignment.notes,
        })
        .collect();

    let total_fees = rows.iter().map(|r| r.fee).sum();

    Ok(Json(ReportResponse {
        year,
        month,
        rows,
        total_fees,
    }))
}
