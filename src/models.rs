// src/models.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type EventId = u64;

/// A campus event that users can register for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub category: String,
    /// Local start time, e.g. "2025-11-10T10:00:00"
    pub date: NaiveDateTime,
    pub location: String,
    pub club_id: u64,
    pub free: bool,
    /// Price in whole currency units
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub requires_verification: bool,
    pub spots_left: u32,
    #[serde(default)]
    pub popularity: u32,
}

impl Event {
    /// Payment is only collected for non-free events with a positive price
    pub fn requires_payment(&self) -> bool {
        !self.free && self.price > 0
    }

    pub fn is_full(&self) -> bool {
        self.spots_left == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user_id: UserId,
    pub event_id: EventId,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationFlag {
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresConfirmation,
    Succeeded,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub user_id: UserId,
    pub event_id: EventId,
    pub amount: u32,
    pub status: PaymentStatus,
    /// Set once a registration has used this intent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

/// The acting user, as supplied by the trusted `X-User-Id` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
}

impl CurrentUser {
    pub fn new(id: UserId) -> Self {
        let name = if id == 1 { "Alice Student" } else { "Demo User" };
        Self {
            id,
            name: name.to_string(),
        }
    }
}
