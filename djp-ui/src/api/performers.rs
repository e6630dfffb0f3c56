//! Performer account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use djp_common::db::models::{Performer, PerformerOverview, PerformerStatus};
use djp_common::db::performers;
use djp_common::Error;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::ApiResult;
use crate::AppState;

/// Registration / account creation request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub dj_name: String,
    pub phone: Option<String>,
    /// Admin-created accounts start active instead of pending
    #[serde(default)]
    pub active: bool,
}

/// POST /api/performers
///
/// Self-registration creates a pending account; with `active` set the
/// account starts active (admin creation). Duplicate username or email
/// returns 409.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Performer>)> {
    for (field, value) in [
        ("username", &req.username),
        ("email", &req.email),
        ("password", &req.password),
        ("dj_name", &req.dj_name),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("{} must not be empty", field)).into());
        }
    }

    let status = if req.active {
        PerformerStatus::Active
    } else {
        PerformerStatus::Pending
    };

    let performer = performers::create(
        &state.db,
        performers::NewPerformer {
            username: req.username,
            email: req.email,
            password: req.password,
            dj_name: req.dj_name,
            phone: req.phone,
            is_admin: false,
            status,
        },
    )
    .await?;

    info!("Registered performer '{}' ({:?})", performer.username, performer.status);
    Ok((StatusCode::CREATED, Json(performer)))
}

/// GET /api/performers
///
/// Roster with per-performer assignment counts.
pub async fn roster(State(state): State<AppState>) -> ApiResult<Json<Vec<PerformerOverview>>> {
    Ok(Json(performers::list_with_counts(&state.db).await?))
}

/// POST /api/performers/:id/deactivate
///
/// Soft-deactivate: the account and its history stay, but the performer
/// no longer appears in willing lists.
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    performers::deactivate(&state.db, &id).await?;
    Ok(Json(json!({ "status": "deactivated" })))
}

/// DELETE /api/performers/:id
///
/// Hard removal; availabilities and assignments cascade.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    performers::remove(&state.db, &id).await?;
    Ok(Json(json!({ "status": "removed" })))
}
