//! Simulated one-time-code verification routes

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::{JsonBody, LooseId};
use super::server::AppState;
use crate::error::Result;
use crate::models::CurrentUser;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssuedResponse {
    ok: bool,
    message: &'static str,
    /// Returned directly since nothing is actually sent
    demo_code: String,
    expires_in_seconds: i64,
}

#[derive(Deserialize)]
pub struct ConfirmBody {
    #[serde(default)]
    code: Option<LooseId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    ok: bool,
    verified: bool,
    verified_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    verified: bool,
    verified_at: Option<DateTime<Utc>>,
}

/// POST /api/verify/request
pub async fn request_code(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Json<CodeIssuedResponse> {
    let issued = state.verification_manager.request_code(user.id);
    Json(CodeIssuedResponse {
        ok: true,
        message: "Verification code generated (simulated)",
        demo_code: issued.code,
        expires_in_seconds: issued.expires_in_seconds,
    })
}

/// POST /api/verify/confirm
pub async fn confirm_code(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<ConfirmBody>,
) -> Result<Json<ConfirmResponse>> {
    let submitted = body.code.map(|c| c.as_text()).unwrap_or_default();
    let flag = state
        .verification_manager
        .confirm_code(user.id, &submitted)?;
    Ok(Json(ConfirmResponse {
        ok: true,
        verified: true,
        verified_at: flag.verified_at,
    }))
}

/// GET /api/verify/status
pub async fn status(State(state): State<AppState>, user: CurrentUser) -> Json<StatusResponse> {
    let flag = state.verification_manager.status(user.id);
    Json(StatusResponse {
        verified: flag.is_some(),
        verified_at: flag.map(|f| f.verified_at),
    })
}
