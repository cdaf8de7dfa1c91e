//! NF1: client-triggering API and notification receiver.
//!
//! `POST /nf2loc` sends NF1's callback location to NF2, then waits on the
//! correlator until NF2's follow-up arrives on the notification route and
//! replies with that follow-up. One exchange is expected in flight at a
//! time; concurrent triggers race for the same slot.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{EndpointConfig, EndpointRole, NodeConfig, NodeKind};
use crate::exchange::{CorrelationGate, ExchangeError, Forwarder, LocationMessage};
use crate::http::request::{log_request, request_id};
use crate::lifecycle::shutdown::Shutdown;
use crate::node::{own_callback, require_endpoint, NodeError, ACK_BODY};
use crate::observability::metrics;

pub const TRIGGER_PATH: &str = "/nf2loc";

/// State shared by NF1's handlers.
#[derive(Clone)]
pub struct Nf1State {
    forwarder: Forwarder,
    correlator: Arc<CorrelationGate>,
    remote_url: Arc<str>,
    callback_url: Arc<str>,
    correlation_timeout: Duration,
    shutdown: CancellationToken,
}

impl Nf1State {
    /// Send our callback location to NF2 and wait for its follow-up.
    async fn exchange(&self) -> Result<LocationMessage, ExchangeError> {
        let outbound = LocationMessage::now(self.callback_url.to_string());
        let peer = self
            .forwarder
            .send(&self.remote_url, &outbound, &self.shutdown)
            .await?;

        if !peer.status.is_success() {
            tracing::warn!(status = %peer.status, "Peer rejected the request");
            return Err(ExchangeError::PeerRejected(peer.status));
        }

        tracing::info!("Waiting for the POST req");
        let started = Instant::now();
        let delivered = self
            .correlator
            .await_delivery(&self.shutdown, self.correlation_timeout)
            .await;
        metrics::record_correlation_wait(started);

        let delivered = delivered?;
        tracing::info!(location = %delivered.location, time = %delivered.time, "POST request received");
        Ok(delivered)
    }
}

/// Build the per-endpoint routers for NF1.
pub fn routes(
    config: &NodeConfig,
    forwarder: Forwarder,
    shutdown: &Shutdown,
) -> Result<Vec<(EndpointConfig, Router)>, NodeError> {
    let api = require_endpoint(NodeKind::Nf1, config, EndpointRole::Api)?;
    let notification = require_endpoint(NodeKind::Nf1, config, EndpointRole::Notification)?;
    let remote_url = config
        .remote_api_root
        .clone()
        .ok_or(NodeError::MissingRemote(NodeKind::Nf1))?;

    let state = Nf1State {
        forwarder,
        correlator: Arc::new(CorrelationGate::new()),
        remote_url: remote_url.into(),
        callback_url: own_callback(config, notification, &config.notification_path)?.into(),
        correlation_timeout: Duration::from_secs(config.timeouts.correlation_secs),
        shutdown: shutdown.token(),
    };
    tracing::info!(callback = %state.callback_url, remote = %state.remote_url, "NF1 exchange configured");

    let api_router = Router::new()
        .route(TRIGGER_PATH, post(trigger_handler))
        .with_state(state.clone());
    let notification_router = Router::new()
        .route(&config.notification_path, post(notification_handler))
        .with_state(state);

    Ok(vec![
        (api.clone(), api_router),
        (notification.clone(), notification_router),
    ])
}

/// `POST /nf2loc`: run one exchange and reply with NF2's follow-up.
async fn trigger_handler(
    State(state): State<Nf1State>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    log_request(&method, &uri, &headers, &body);

    let span = tracing::info_span!(
        "exchange",
        exchange_id = %Uuid::new_v4(),
        request_id = %request_id(&headers)
    );
    let response = match state.exchange().instrument(span).await {
        Ok(delivered) => (StatusCode::OK, Json(delivered)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Exchange failed");
            e.into_response()
        }
    };

    metrics::record_request("trigger", response.status().as_u16());
    response
}

/// Notification receiver: decode NF2's follow-up and hand it to the trigger.
async fn notification_handler(
    State(state): State<Nf1State>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    log_request(&method, &uri, &headers, &body);

    let response = match LocationMessage::decode(&body) {
        Ok(message) => {
            tracing::info!(location = %message.location, time = %message.time, "Notification received");
            state.correlator.deposit(message);
            tracing::info!("NF1 Handler Completed");
            (StatusCode::OK, ACK_BODY).into_response()
        }
        Err(e) => e.into_response(),
    };

    metrics::record_request("notification", response.status().as_u16());
    response
}
