use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::error::{AppError, Result};
use crate::models::{Event, EventId, Registration, UserId};

/// In-memory event table plus the registrations made against it
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    /// Map of event ID to event
    events: HashMap<EventId, Event>,

    /// Registrations in creation order
    registrations: Vec<Registration>,
}

impl EventStore {
    /// Seed the store from a catalog
    pub fn from_catalog(catalog: CatalogConfig) -> Self {
        let events = catalog.events.into_iter().map(|e| (e.id, e)).collect();
        Self {
            events,
            registrations: Vec::new(),
        }
    }

    pub fn get_event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    /// All events ordered by date, earliest first
    pub fn list_events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.values().cloned().collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        events
    }

    pub fn is_registered(&self, user_id: UserId, event_id: EventId) -> bool {
        self.registrations
            .iter()
            .any(|r| r.user_id == user_id && r.event_id == event_id)
    }

    /// Registrations for a user, in the order they were made
    pub fn registrations_for_user(&self, user_id: UserId) -> Vec<&Registration> {
        self.registrations
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect()
    }

    #[cfg(test)]
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Append a registration and take one spot.
    ///
    /// Fails without mutating if the event is unknown, full, or the user
    /// already holds a registration for it.
    pub fn commit_registration(&mut self, user_id: UserId, event_id: EventId) -> Result<Registration> {
        if self.is_registered(user_id, event_id) {
            return Err(AppError::Internal {
                message: format!("user {} already registered for event {}", user_id, event_id),
            });
        }

        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(AppError::EventNotFound)?;
        if event.is_full() {
            return Err(AppError::EventFull);
        }
        event.spots_left = event.spots_left.saturating_sub(1);

        let registration = Registration {
            user_id,
            event_id,
            at: Utc::now(),
        };
        self.registrations.push(registration.clone());
        Ok(registration)
    }
}

/// Shared event store type
pub type SharedEventStore = Arc<tokio::sync::RwLock<EventStore>>;

pub fn create_shared_event_store(store: EventStore) -> SharedEventStore {
    Arc::new(tokio::sync::RwLock::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EventStore {
        EventStore::from_catalog(CatalogConfig::default())
    }

    #[test]
    fn test_events_sorted_by_date() {
        let mut catalog = CatalogConfig::default();
        catalog.events.reverse();
        let store = EventStore::from_catalog(catalog);

        let ids: Vec<EventId> = store.list_events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![101, 102, 103, 104]);
    }

    #[test]
    fn test_commit_takes_a_spot() {
        let mut store = store();
        let before = store.get_event(101).unwrap().spots_left;

        let reg = store.commit_registration(1, 101).unwrap();
        assert_eq!(reg.user_id, 1);
        assert_eq!(reg.event_id, 101);
        assert_eq!(store.get_event(101).unwrap().spots_left, before - 1);
        assert!(store.is_registered(1, 101));
        assert!(!store.is_registered(2, 101));
    }

    #[test]
    fn test_commit_twice_is_rejected() {
        let mut store = store();
        store.commit_registration(1, 101).unwrap();
        let spots = store.get_event(101).unwrap().spots_left;

        assert!(store.commit_registration(1, 101).is_err());
        assert_eq!(store.get_event(101).unwrap().spots_left, spots);
        assert_eq!(store.registration_count(), 1);
    }

    #[test]
    fn test_capacity_never_negative() {
        let mut catalog = CatalogConfig::default();
        catalog.events.retain(|e| e.id == 103);
        catalog.events[0].spots_left = 2;
        let mut store = EventStore::from_catalog(catalog);

        assert!(store.commit_registration(1, 103).is_ok());
        assert!(store.commit_registration(2, 103).is_ok());
        assert!(matches!(
            store.commit_registration(3, 103),
            Err(AppError::EventFull)
        ));
        assert_eq!(store.get_event(103).unwrap().spots_left, 0);
        assert_eq!(store.registration_count(), 2);
    }

    #[test]
    fn test_unknown_event() {
        let mut store = store();
        assert!(matches!(
            store.commit_registration(1, 999),
            Err(AppError::EventNotFound)
        ));
    }

    #[test]
    fn test_registrations_for_user_in_order() {
        let mut store = store();
        store.commit_registration(1, 103).unwrap();
        store.commit_registration(2, 101).unwrap();
        store.commit_registration(1, 101).unwrap();

        let mine: Vec<EventId> = store
            .registrations_for_user(1)
            .iter()
            .map(|r| r.event_id)
            .collect();
        assert_eq!(mine, vec![103, 101]);
    }
}
