//! Registration workflow: preview requirements and commit a seat.
//!
//! Verification and payment are checked independently against the event and
//! the acting user. Both must pass before a spot is taken. The commit runs
//! under the event store's write lock, so a failed check leaves every table
//! untouched.

use std::sync::Arc;
use tracing::{debug, info};

use super::payment_manager::SharedPaymentManager;
use super::verification_manager::SharedVerificationManager;
use crate::error::{AppError, Result};
use crate::models::{Event, EventId, Registration, UserId};
use crate::state::SharedEventStore;

/// What a user still has to do before registering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub needs_verification: bool,
    pub needs_payment: bool,
}

impl Requirements {
    /// Verification is needed iff the event asks for it and the user has none;
    /// payment is needed iff the event is paid
    pub fn evaluate(event: &Event, user_verified: bool) -> Self {
        Self {
            needs_verification: event.requires_verification && !user_verified,
            needs_payment: event.requires_payment(),
        }
    }
}

/// Result of a registration preview
#[derive(Debug, Clone)]
pub struct Preview {
    pub event: Event,
    pub requirements: Requirements,
}

/// Result of a register call that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Registered(Registration),
    AlreadyRegistered,
}

/// A registration joined with its event, for listing
#[derive(Debug, Clone)]
pub struct RegistrationWithEvent {
    pub registration: Registration,
    pub event: Option<Event>,
}

pub struct RegistrationManager {
    event_store: SharedEventStore,
    verification_manager: SharedVerificationManager,
    payment_manager: SharedPaymentManager,
}

impl RegistrationManager {
    pub fn new(
        event_store: SharedEventStore,
        verification_manager: SharedVerificationManager,
        payment_manager: SharedPaymentManager,
    ) -> Self {
        Self {
            event_store,
            verification_manager,
            payment_manager,
        }
    }

    /// Report what the user must do before registering. Mutates nothing.
    pub async fn preview(&self, user_id: UserId, event_id: EventId) -> Result<Preview> {
        let store = self.event_store.read().await;
        let event = store
            .get_event(event_id)
            .cloned()
            .ok_or(AppError::EventNotFound)?;
        let requirements =
            Requirements::evaluate(&event, self.verification_manager.is_verified(user_id));

        debug!(user_id, event_id, ?requirements, "Registration preview");
        Ok(Preview {
            event,
            requirements,
        })
    }

    /// Register the user for the event if every precondition holds
    pub async fn register(
        &self,
        user_id: UserId,
        event_id: EventId,
        payment_id: Option<&str>,
    ) -> Result<RegisterOutcome> {
        let mut store = self.event_store.write().await;
        let event = store
            .get_event(event_id)
            .cloned()
            .ok_or(AppError::EventNotFound)?;

        if store.is_registered(user_id, event_id) {
            debug!(user_id, event_id, "Already registered");
            return Ok(RegisterOutcome::AlreadyRegistered);
        }

        if event.is_full() {
            return Err(AppError::EventFull);
        }

        let requirements =
            Requirements::evaluate(&event, self.verification_manager.is_verified(user_id));
        if requirements.needs_verification {
            return Err(AppError::VerificationRequired);
        }
        let paid_with = if requirements.needs_payment {
            self.payment_manager
                .check_usable(payment_id, user_id, event_id)?;
            payment_id
        } else {
            None
        };

        // Nothing below can fail once the seat is committed
        let registration = store.commit_registration(user_id, event_id)?;
        if let Some(id) = paid_with {
            self.payment_manager.consume(id);
        }

        info!(
            user_id,
            event_id,
            payment_id = paid_with.unwrap_or("-"),
            "Registered for '{}'",
            event.title
        );
        Ok(RegisterOutcome::Registered(registration))
    }

    /// The user's registrations with their events attached
    pub async fn registrations_for_user(&self, user_id: UserId) -> Vec<RegistrationWithEvent> {
        let store = self.event_store.read().await;
        store
            .registrations_for_user(user_id)
            .into_iter()
            .map(|r| RegistrationWithEvent {
                registration: r.clone(),
                event: store.get_event(r.event_id).cloned(),
            })
            .collect()
    }
}

/// Shared registration manager type
pub type SharedRegistrationManager = Arc<RegistrationManager>;

pub fn create_shared_registration_manager(
    event_store: SharedEventStore,
    verification_manager: SharedVerificationManager,
    payment_manager: SharedPaymentManager,
) -> SharedRegistrationManager {
    Arc::new(RegistrationManager::new(
        event_store,
        verification_manager,
        payment_manager,
    ))
}
