use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Lookup errors
    #[error("Event not found")]
    EventNotFound,

    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Not found")]
    NotFound,

    // Registration errors
    #[error("Event is full")]
    EventFull,

    #[error("Verification required")]
    VerificationRequired,

    #[error("Missing or invalid payment")]
    InvalidPayment,

    #[error("Payment not completed")]
    PaymentNotCompleted,

    #[error("Payment already used")]
    PaymentAlreadyUsed,

    // Verification errors
    #[error("No code requested")]
    NoCodeRequested,

    #[error("Code expired")]
    CodeExpired,

    #[error("Invalid code")]
    InvalidCode,

    // Request errors
    #[error("Invalid X-User-Id header")]
    InvalidUserHeader,

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    // Catalog errors
    #[error("Failed to load event catalog '{path}': {source}")]
    CatalogLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse event catalog '{path}': {source}")]
    CatalogParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid event catalog: {message}")]
    CatalogValidation { message: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EventNotFound | AppError::PaymentNotFound | AppError::NotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::EventFull
            | AppError::VerificationRequired
            | AppError::InvalidPayment
            | AppError::PaymentNotCompleted
            | AppError::PaymentAlreadyUsed
            | AppError::NoCodeRequested
            | AppError::CodeExpired
            | AppError::InvalidCode
            | AppError::InvalidUserHeader
            | AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::CatalogLoad { .. }
            | AppError::CatalogParse { .. }
            | AppError::CatalogValidation { .. }
            | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            Json(serde_json::json!({ "ok": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
