//! HTTP+JSON API for browsing events, verifying, paying, and registering
//!
//! The acting user is taken from the trusted `X-User-Id` header.

mod admin;
mod auth;
mod events;
mod payments;
mod registrations;
mod server;
mod verify;

pub use server::{start_web_server, AppState};
