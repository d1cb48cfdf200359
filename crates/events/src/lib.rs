//! Core domain for the board event monitor.
//!
//! This crate turns inbound board notifications into deduplicated occurrence
//! records. It owns two things: the identity derivation that decides which
//! notifications describe the same change, and the concurrent counter store
//! that tracks how often each change has been seen.
//!
//! ## Architectural Layer
//!
//! **Business logic.** This crate has no I/O dependencies. HTTP intake,
//! authentication, configuration and log sinks live in the `listener` and
//! `cli` crates, which hand this crate a parsed [`RawEvent`] and log the
//! [`EventRecord`] it returns.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | [`IdentityToken`] and its derivation |
//! | [`types`] | Value types (`Timestamp`, `RawEvent`, `EventRecord`) |
//! | [`clock`] | The [`Clock`] time-source seam |
//! | [`store`] | The deduplicating [`EventStore`] |
//!
//! ## Limitations
//!
//! State is in-memory only and never evicted: a restart loses every count, and
//! the store grows by one record per distinct identity for the life of the
//! process.

pub mod clock;
pub mod identifiers;
pub mod store;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use clock::{Clock, SystemClock};
pub use identifiers::{IdentityToken, TOKEN_LEN};
pub use store::EventStore;
pub use types::{EventRecord, RawEvent, Timestamp};
