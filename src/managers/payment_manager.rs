use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{Event, EventId, PaymentIntent, PaymentStatus, UserId};

/// Simulated payment processor holding intents in memory
pub struct PaymentManager {
    /// Payment intents (payment_id -> intent)
    intents: DashMap<String, PaymentIntent>,

    /// Next numeric suffix for `pay_<n>` ids
    next_id: AtomicU64,
}

impl PaymentManager {
    pub fn new() -> Self {
        Self {
            intents: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Open an intent for the event's price
    pub fn create_intent(&self, user_id: UserId, event: &Event) -> PaymentIntent {
        let id = format!("pay_{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let intent = PaymentIntent {
            id: id.clone(),
            user_id,
            event_id: event.id,
            amount: event.price,
            status: PaymentStatus::RequiresConfirmation,
            consumed_at: None,
        };
        self.intents.insert(id.clone(), intent.clone());
        info!(user_id, event_id = event.id, payment_id = %id, "Created payment intent");
        intent
    }

    /// Mark an intent as succeeded; the simulated processor always approves
    pub fn confirm(&self, user_id: UserId, payment_id: &str) -> Result<PaymentStatus> {
        let mut intent = self
            .intents
            .get_mut(payment_id)
            .filter(|i| i.user_id == user_id)
            .ok_or(AppError::PaymentNotFound)?;

        if intent.status == PaymentStatus::RequiresConfirmation {
            intent.status = PaymentStatus::Succeeded;
            info!(user_id, payment_id, "Payment confirmed");
        }
        Ok(intent.status)
    }

    /// Look up an intent owned by the user
    pub fn get_for_user(&self, user_id: UserId, payment_id: &str) -> Option<PaymentIntent> {
        self.intents
            .get(payment_id)
            .filter(|i| i.user_id == user_id)
            .map(|i| i.clone())
    }

    pub fn get(&self, payment_id: &str) -> Option<PaymentIntent> {
        self.intents.get(payment_id).map(|i| i.clone())
    }

    /// Check that an intent can pay for this user's seat at this event
    pub fn check_usable(
        &self,
        payment_id: Option<&str>,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<()> {
        let intent = payment_id
            .and_then(|id| self.get(id))
            .ok_or(AppError::InvalidPayment)?;
        check_intent(&intent, user_id, event_id)
    }

    /// Record that a registration used this intent.
    ///
    /// Callers pass an id that `check_usable` accepted; the first use
    /// timestamp is kept if the intent was already marked.
    pub fn consume(&self, payment_id: &str) {
        if let Some(mut intent) = self.intents.get_mut(payment_id) {
            intent.consumed_at.get_or_insert_with(Utc::now);
        }
    }

    #[cfg(test)]
    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }
}

impl Default for PaymentManager {
    fn default() -> Self {
        Self::new()
    }
}

/// An intent pays for a registration only if it belongs to the same user and
/// event, has succeeded, and has not been used before
pub fn check_intent(intent: &PaymentIntent, user_id: UserId, event_id: EventId) -> Result<()> {
    if intent.user_id != user_id || intent.event_id != event_id {
        return Err(AppError::InvalidPayment);
    }
    if intent.status != PaymentStatus::Succeeded {
        return Err(AppError::PaymentNotCompleted);
    }
    if intent.is_consumed() {
        return Err(AppError::PaymentAlreadyUsed);
    }
    Ok(())
}

/// Shared payment manager type
pub type SharedPaymentManager = Arc<PaymentManager>;

pub fn create_shared_payment_manager() -> SharedPaymentManager {
    Arc::new(PaymentManager::new())
}
