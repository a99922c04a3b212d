//! Registration preview, commit, and listing routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::auth::{JsonBody, LooseId};
use super::server::AppState;
use crate::error::{AppError, Result};
use crate::managers::RegisterOutcome;
use crate::models::{CurrentUser, Event, EventId, Registration};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBody {
    #[serde(default)]
    event_id: Option<LooseId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    event_id: Option<LooseId>,
    #[serde(default)]
    payment_id: Option<String>,
}

#[derive(Serialize)]
pub struct EventSummary {
    id: EventId,
    title: String,
    price: u32,
    free: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    ok: bool,
    event: EventSummary,
    needs_payment: bool,
    needs_verification: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum RegisterResponse {
    Registered { ok: bool, registered: bool },
    Already { ok: bool, message: &'static str },
}

#[derive(Serialize)]
pub struct MyRegistration {
    #[serde(flatten)]
    registration: Registration,
    event: Option<Event>,
}

fn event_id(id: Option<LooseId>) -> Result<EventId> {
    id.and_then(|id| id.as_u64()).ok_or(AppError::EventNotFound)
}

/// POST /api/registrations/preview
pub async fn preview(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<PreviewBody>,
) -> Result<Json<PreviewResponse>> {
    let preview = state
        .registration_manager
        .preview(user.id, event_id(body.event_id)?)
        .await?;

    Ok(Json(PreviewResponse {
        ok: true,
        event: EventSummary {
            id: preview.event.id,
            title: preview.event.title,
            price: preview.event.price,
            free: preview.event.free,
        },
        needs_payment: preview.requirements.needs_payment,
        needs_verification: preview.requirements.needs_verification,
    }))
}

/// POST /api/registrations/register
pub async fn register(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(body): JsonBody<RegisterBody>,
) -> Result<Json<RegisterResponse>> {
    debug!(user_id = user.id, "Register request from {}", user.name);
    let outcome = state
        .registration_manager
        .register(
            user.id,
            event_id(body.event_id)?,
            body.payment_id.as_deref(),
        )
        .await?;

    Ok(Json(match outcome {
        RegisterOutcome::Registered(_) => RegisterResponse::Registered {
            ok: true,
            registered: true,
        },
        RegisterOutcome::AlreadyRegistered => RegisterResponse::Already {
            ok: true,
            message: "Already registered",
        },
    }))
}

/// GET /api/registrations/me
pub async fn my_registrations(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Json<Vec<MyRegistration>> {
    let mine = state
        .registration_manager
        .registrations_for_user(user.id)
        .await
        .into_iter()
        .map(|r| MyRegistration {
            registration: r.registration,
            event: r.event,
        })
        .collect();
    Json(mine)
}
