//! Assignment endpoints

use axum::{extract::State, http::StatusCode, Json};
use djp_common::db::models::Assignment;
use djp_common::db::performers;
use djp_common::notify::{self, NotificationMessage, Recipient};
use djp_common::resolver::{self, AssignRequest};
use djp_common::time;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{parse_date, parse_slot, ApiResult};
use crate::AppState;

/// Assignment creation request
#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub performer_id: String,
    pub date: String,
    /// Who is asking: the coordinator, or the performer booking themselves
    pub requested_by: String,
    pub notes: Option<String>,
}

/// Assignment removal request
#[derive(Debug, Deserialize)]
pub struct RemoveAssignmentRequest {
    pub date: String,
    /// Optional when the date holds a single assignment
    pub slot: Option<String>,
}

/// POST /api/assignments
///
/// Runs the resolver; on success the assignment comes back with the slot
/// actually occupied and its fee, and a notification is queued for the
/// performer. Conflicts return 409 with the blocking slot in the message.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAssignmentRequest>,
) -> ApiResult<(StatusCode, Json<Assignment>)> {
    let date = parse_date(&req.date)?;

    let assignment = resolver::try_assign(
        &state.db,
        AssignRequest {
            date,
            performer_id: req.performer_id,
            requested_by: req.requested_by,
            notes: req.notes,
            today: time::today(),
        },
    )
    .await?;

    // Fire-and-forget: a dropped notification never unwinds the booking
    let performer = performers::get(&state.db, &assignment.performer_id).await?;
    notify::enqueue(
        &state.notify_tx,
        NotificationMessage::Assigned {
            recipient: Recipient::from(&performer),
            assignment: assignment.clone(),
        },
    );

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /api/assignments
///
/// Removes the matching assignment. Without a slot, the date must hold
/// exactly one assignment.
pub async fn remove(
    State(state): State<AppState>,
    Json(req): Json<RemoveAssignmentRequest>,
) -> ApiResult<Json<Value>> {
    let date = parse_date(&req.date)?;
    let slot = req.slot.as_deref().map(parse_slot).transpose()?;

    resolver::unassign(&state.db, date, slot).await?;
    Ok(Json(json!({ "status": "removed" })))
}
