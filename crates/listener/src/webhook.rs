//! Webhook and health routes.

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use events::{EventRecord, EventStore, RawEvent};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::ListenerError;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct ListenerState {
    store: Arc<EventStore>,
    auth_token: Arc<str>,
}

impl ListenerState {
    /// Creates handler state recording into `store` and accepting requests
    /// that present `auth_token`.
    pub fn new(store: Arc<EventStore>, auth_token: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            auth_token: auth_token.into(),
        }
    }

    /// The store events are recorded into.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }
}

impl std::fmt::Debug for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerState")
            .field("store", &self.store)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Builds the router exposing `POST /webhook` and `GET /health`.
///
/// Works with or without connection info; [`serve`] supplies it so rejected
/// requests are logged with their remote address.
pub fn router(state: ListenerState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds the listening socket.
pub async fn bind(address: SocketAddr) -> Result<TcpListener, ListenerError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind { address, source })
}

/// Serves requests on `listener` until `shutdown` resolves, then waits for
/// in-flight requests to finish.
pub async fn serve(
    listener: TcpListener,
    state: ListenerState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ListenerError> {
    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}

/// Authenticates, parses and records one webhook delivery.
async fn handle_webhook(
    State(state): State<ListenerState>,
    remote: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, &'static str)> {
    if bearer_token(&headers) != &*state.auth_token {
        match remote {
            Some(ConnectInfo(addr)) => warn!(remote_addr = %addr, "Unauthorized webhook attempt"),
            None => warn!("Unauthorized webhook attempt"),
        }
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    let event: RawEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            error!(error = %err, body_len = body.len(), "Failed to unmarshal JSON payload");
            return Err((StatusCode::BAD_REQUEST, "Bad Request: Invalid JSON"));
        }
    };

    let record = state.store.record_occurrence(event.with_payload(body));
    log_record(&record);
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness check.
async fn health(State(state): State<ListenerState>) -> &'static str {
    debug!(identities = state.store.len(), "Health check");
    "OK"
}

/// Extracts the credential from `Authorization`, tolerating a missing
/// `Bearer ` prefix.
fn bearer_token(headers: &HeaderMap) -> &str {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    value.strip_prefix("Bearer ").unwrap_or(value)
}

/// Emits one structured line per processed event. Every record and event
/// field is its own log field; only the raw body stays a string.
fn log_record(record: &EventRecord) {
    let detail = &record.last_detail;
    info!(
        token = %record.token,
        count = record.count,
        first_seen = %record.first_seen,
        last_seen = %record.last_seen,
        event_type = %detail.event_type,
        user_id = %detail.user_id,
        block_id = %detail.block_id,
        board_id = %detail.board_id,
        occurred_at = detail.occurred_at,
        payload = %String::from_utf8_lossy(&detail.raw_payload),
        "Board event processed"
    );
}
