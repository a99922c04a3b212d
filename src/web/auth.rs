//! Request extractors: the trusted identity header and JSON bodies
//!
//! There is no real authentication. The acting user comes from `X-User-Id`
//! and defaults to user 1 when the header is absent.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{CurrentUser, UserId};

pub const USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_USER_ID: UserId = 1;

/// Read the acting user's ID from the trusted header
pub fn user_id_from_headers(headers: &HeaderMap) -> Result<UserId, AppError> {
    match headers.get(USER_ID_HEADER) {
        None => Ok(DEFAULT_USER_ID),
        Some(value) => {
            let raw = value.to_str().map_err(|_| AppError::InvalidUserHeader)?.trim();
            if raw.is_empty() {
                return Ok(DEFAULT_USER_ID);
            }
            raw.parse().map_err(|_| AppError::InvalidUserHeader)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id_from_headers(&parts.headers).map(CurrentUser::new)
    }
}

/// JSON body whose rejection renders the standard error envelope
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::MalformedPayload {
                message: rejection.body_text(),
            }),
        }
    }
}

/// A numeric ID that clients may send either as a number or a string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseId {
    Number(u64),
    Text(String),
}

impl LooseId {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            LooseId::Number(n) => Some(*n),
            LooseId::Text(s) => s.trim().parse().ok(),
        }
    }

    /// The value as text, as it would be compared against a code
    pub fn as_text(&self) -> String {
        match self {
            LooseId::Number(n) => n.to_string(),
            LooseId::Text(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_header_defaults_to_first_user() {
        let headers = HeaderMap::new();
        assert_eq!(user_id_from_headers(&headers).unwrap(), 1);
    }

    #[test]
    fn test_numeric_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" 42 "));
        assert_eq!(user_id_from_headers(&headers).unwrap(), 42);
    }

    #[test]
    fn test_non_numeric_header_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        assert!(matches!(
            user_id_from_headers(&headers),
            Err(AppError::InvalidUserHeader)
        ));
    }

    #[test]
    fn test_loose_id() {
        let n: LooseId = serde_json::from_str("102").unwrap();
        let s: LooseId = serde_json::from_str("\"102\"").unwrap();
        let bad: LooseId = serde_json::from_str("\"abc\"").unwrap();

        assert_eq!(n.as_u64(), Some(102));
        assert_eq!(s.as_u64(), Some(102));
        assert_eq!(bad.as_u64(), None);
        assert_eq!(n.as_text(), "102");
    }
}
