//! Event identity tokens.
//!
//! Two notifications describe the same logical change when their type, user,
//! block and board agree. [`IdentityToken::derive`] collapses those four fields
//! into a fixed-width digest that the store uses as its map key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length in characters of every [`IdentityToken`] (hex-encoded SHA-256).
pub const TOKEN_LEN: usize = 64;

/// Deterministic deduplication key for a board event.
///
/// Tokens are opaque: they carry no ordering or structural meaning beyond
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Derives the token for an event identity.
    ///
    /// Each field is framed with a label and its byte length before hashing,
    /// so moving characters across a field boundary always changes the input.
    /// Any strings are valid, including empty ones.
    pub fn derive(event_type: &str, user_id: &str, block_id: &str, board_id: &str) -> Self {
        let mut hasher = Sha256::new();
        for (label, field) in [
            ("type", event_type),
            ("user", user_id),
            ("block", block_id),
            ("board", board_id),
        ] {
            hasher.update(label.as_bytes());
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
