//! Listener error types.

use std::net::SocketAddr;

use thiserror::Error;

/// Failures that stop the HTTP listener.
///
/// Per-request problems (bad credentials, malformed bodies) are answered with
/// an HTTP status and never surface here.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listening socket could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Address that was requested.
        address: SocketAddr,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The server loop terminated with an I/O error.
    #[error("Server failed: {0}")]
    Serve(#[from] std::io::Error),
}
