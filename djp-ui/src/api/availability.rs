//! Availability declaration endpoint

use axum::{extract::State, Json};
use djp_common::db::models::Availability;
use djp_common::resolver::{self, AvailabilityChange};
use djp_common::time;
use serde::Deserialize;

use crate::api::{parse_date, parse_slot, ApiResult};
use crate::AppState;

/// Availability change request
#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub performer_id: String,
    pub date: String,
    pub willing: bool,
    pub slot: Option<String>,
    pub notes: Option<String>,
}

/// PUT /api/availability
///
/// Declares or updates willingness for one date (upsert). Rejected for
/// past dates and once the performer is assigned on that date.
pub async fn set_availability(
    State(state): State<AppState>,
    Json(req): Json<SetAvailabilityRequest>,
) -> ApiResult<Json<Availability>> {
    let date = parse_date(&req.date)?;
    let slot = req.slot.as_deref().map(parse_slot).transpose()?;

    let saved = resolver::set_availability(
        &state.db,
        AvailabilityChange {
            performer_id: req.performer_id,
            date,
            willing: req.willing,
            slot,
            notes: req.notes,
            today: time::today(),
        },
    )
    .await?;

    Ok(Json(saved))
}
