//! Time source for the counter store.

use crate::Timestamp;

/// Supplies the "now" used for first/last-seen bookkeeping.
///
/// Implementations must be cheap and non-blocking: the store calls
/// [`Clock::now`] while holding its lock.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
