//! Board event monitor HTTP intake.
//!
//! Binds an HTTP server and receives the board tool's webhook deliveries:
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `POST /webhook` | Checks the shared-secret bearer token, parses the JSON body into an [`events::RawEvent`], records it, logs the resulting [`events::EventRecord`], answers `204` |
//! | `GET /health` | Answers `200 OK` |
//!
//! Unauthorised requests get `401`, unparseable bodies `400`, and any other
//! method on `/webhook` `405`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport, authentication and body parsing live here.
//! The [`events`] crate sees only [`events::RawEvent`] in and
//! [`events::EventRecord`] out.

pub mod errors;
pub mod webhook;

pub use errors::ListenerError;
pub use webhook::{bind, router, serve, ListenerState};
