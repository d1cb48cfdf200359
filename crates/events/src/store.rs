//! Deduplicating occurrence counter.
//!
//! [`EventStore`] maps each [`IdentityToken`] to an [`EventRecord`]. Records
//! are created on first sight and updated on every repeat; nothing is ever
//! evicted, so memory grows with the number of distinct identities for the
//! life of the process.
//!
//! ## Concurrency
//!
//! A single mutex guards the whole map. The lookup, create-or-update and
//! snapshot happen inside one critical section, so every call is linearizable
//! with respect to every other call and `count` always equals the number of
//! calls made for that token.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Clock, EventRecord, IdentityToken, RawEvent, SystemClock};

/// In-memory store of per-identity occurrence records.
///
/// Construct one per process and share it behind an [`Arc`]; independent
/// instances never observe each other.
pub struct EventStore {
    records: Mutex<HashMap<IdentityToken, EventRecord>>,
    clock: Arc<dyn Clock>,
}

impl EventStore {
    /// Creates an empty store timed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store timed by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Records one occurrence of `event` and returns the updated record.
    ///
    /// The first occurrence of an identity creates a record with
    /// `count == 1` and `first_seen == last_seen`. Each later occurrence bumps
    /// `count`, advances `last_seen` (never backwards, even if the clock
    /// does) and replaces `last_detail` with `event`.
    pub fn record_occurrence(&self, event: RawEvent) -> EventRecord {
        let token = event.identity();
        let mut records = self.lock();
        let now = self.clock.now();

        match records.entry(token) {
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                record.count += 1;
                record.last_seen = record.last_seen.max(now);
                record.last_detail = event;
                record.clone()
            }
            Entry::Vacant(slot) => {
                let record = EventRecord {
                    token: slot.key().clone(),
                    first_seen: now,
                    last_seen: now,
                    count: 1,
                    last_detail: event,
                };
                slot.insert(record).clone()
            }
        }
    }

    /// Returns a snapshot of the record for `token`, if one exists.
    pub fn get(&self, token: &IdentityToken) -> Option<EventRecord> {
        self.lock().get(token).cloned()
    }

    /// Number of distinct identities seen so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no event has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every mutation leaves the map consistent, so a guard poisoned by a
    // panicking caller is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<IdentityToken, EventRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("identities", &self.len())
            .finish_non_exhaustive()
    }
}
