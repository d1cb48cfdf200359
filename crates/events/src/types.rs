//! Shared value types for the board event domain.
//!
//! [`RawEvent`] is what the webhook collaborator hands to the store;
//! [`EventRecord`] is what the store hands back. Both serialise to the
//! camelCase JSON shape used in structured logs.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::IdentityToken;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Inbound event
// ---------------------------------------------------------------------------

/// A change notification delivered by the board tool's webhook.
///
/// Only `event_type`, `user_id`, `block_id` and `board_id` participate in
/// identity (see [`RawEvent::identity`]). `occurred_at` and `raw_payload` are
/// carried for logging and never affect deduplication.
///
/// Every field defaults to its empty value so a partially populated body still
/// yields an event; the store never rejects one.
///
/// ```json
/// {
///   "type": "block-changed",
///   "userId": "u1",
///   "blockId": "b1",
///   "boardId": "brd1",
///   "timestamp": 1000
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEvent {
    /// Kind of change, e.g. `"block-changed"`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// User who performed the change.
    pub user_id: String,

    /// Card or block that changed.
    pub block_id: String,

    /// Board containing the block.
    pub board_id: String,

    /// Event time as reported by the sender.
    #[serde(rename = "timestamp")]
    pub occurred_at: i64,

    /// Complete request body as received.
    ///
    /// Never read from the JSON document itself; the listener fills it in
    /// after parsing.
    #[serde(rename = "payload", skip_deserializing, serialize_with = "serialize_payload")]
    pub raw_payload: Bytes,
}

impl RawEvent {
    /// Derives the deduplication key for this event.
    pub fn identity(&self) -> IdentityToken {
        IdentityToken::derive(&self.event_type, &self.user_id, &self.block_id, &self.board_id)
    }

    /// Returns a copy of this event carrying `payload` as its raw body.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.raw_payload = payload.into();
        self
    }
}

/// Renders the opaque payload for logs: embedded JSON when the bytes parse,
/// a lossy UTF-8 string otherwise, `null` when empty.
fn serialize_payload<S: Serializer>(payload: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    if payload.is_empty() {
        return serializer.serialize_none();
    }
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(value) => value.serialize(serializer),
        Err(_) => serializer.serialize_str(&String::from_utf8_lossy(payload)),
    }
}

// ---------------------------------------------------------------------------
// Per-identity record
// ---------------------------------------------------------------------------

/// Occurrence counter state for one [`IdentityToken`].
///
/// Instances handed out by [`crate::EventStore`] are snapshots; mutating one
/// has no effect on the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Deduplication key this record is filed under.
    pub token: IdentityToken,

    /// When the first occurrence was recorded. Never changes after creation.
    pub first_seen: Timestamp,

    /// When the most recent occurrence was recorded. Never moves backwards.
    pub last_seen: Timestamp,

    /// Number of occurrences recorded since process start. Always `>= 1`.
    pub count: u64,

    /// The most recently submitted event for this identity.
    #[serde(rename = "details")]
    pub last_detail: RawEvent,
}
