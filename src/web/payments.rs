//! Simulated payment routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::auth::{JsonBody, LooseId};
use super::server::AppState;
use crate::error::{AppError, Result};
use crate::models::{CurrentUser, PaymentIntent, PaymentStatus};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentBody {
    #[serde(default)]
    event_id: Option<LooseId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    ok: bool,
    payment_id: String,
    client_secret: String,
    amount: u32,
    status: PaymentStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBody {
    #[serde(default)]
    payment_id: Option<String>,
}

#[derive(Serialize)]
pub struct ConfirmResponse {
    ok: bool,
    status: PaymentStatus,
}

/// POST /api/payments/intent
pub async fn create_intent(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<IntentBody>,
) -> Result<Json<IntentResponse>> {
    let event = {
        let store = state.event_store.read().await;
        body.event_id
            .and_then(|id| id.as_u64())
            .and_then(|id| store.get_event(id).cloned())
            .ok_or(AppError::EventNotFound)?
    };

    let intent = state.payment_manager.create_intent(user.id, &event);
    Ok(Json(IntentResponse {
        ok: true,
        client_secret: format!("demo_secret_{}", intent.id),
        payment_id: intent.id,
        amount: intent.amount,
        status: intent.status,
    }))
}

/// POST /api/payments/confirm
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<ConfirmBody>,
) -> Result<Json<ConfirmResponse>> {
    let payment_id = body.payment_id.ok_or(AppError::PaymentNotFound)?;
    let status = state.payment_manager.confirm(user.id, &payment_id)?;
    Ok(Json(ConfirmResponse { ok: true, status }))
}

/// GET /api/payments/:id - Only visible to the intent's owner
pub async fn get_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentIntent>> {
    state
        .payment_manager
        .get_for_user(user.id, &payment_id)
        .map(Json)
        .ok_or(AppError::NotFound)
}
