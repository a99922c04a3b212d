pub mod event_store;

pub use event_store::{create_shared_event_store, EventStore, SharedEventStore};
