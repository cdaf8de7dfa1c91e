//! NF2: location receiver with a delayed follow-up.
//!
//! `POST /nf2` acknowledges immediately, then after a short delay posts NF2's
//! own location back to the sender. The follow-up runs on a tracked task and
//! is abandoned if shutdown fires first.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use url::Url;

use crate::config::{EndpointConfig, EndpointRole, NodeConfig, NodeKind};
use crate::exchange::{ExchangeError, Forwarder, LocationMessage};
use crate::http::request::{log_request, request_id};
use crate::lifecycle::shutdown::Shutdown;
use crate::node::{own_callback, require_endpoint, NodeError, ACK_BODY};
use crate::observability::metrics;

pub const NF2_PATH: &str = "/nf2";

#[derive(Clone)]
pub struct Nf2State {
    forwarder: Forwarder,
    callback_url: Arc<str>,
    remote_override: Option<Arc<str>>,
    delay: Duration,
    shutdown: CancellationToken,
    follow_ups: TaskTracker,
}

impl Nf2State {
    /// Where the follow-up for `inbound` goes.
    fn follow_up_target(&self, inbound: &LocationMessage) -> Result<String, ExchangeError> {
        if let Some(remote) = &self.remote_override {
            return Ok(remote.to_string());
        }
        validate_location(&inbound.location)
    }

    /// Spawn the delayed follow-up to `target`.
    fn schedule_follow_up(&self, target: String) {
        let forwarder = self.forwarder.clone();
        let callback = self.callback_url.clone();
        let delay = self.delay;
        let token = self.shutdown.clone();
        let span = tracing::info_span!("follow_up", target = %target);

        self.follow_ups.spawn(
            async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        let message = LocationMessage::now(callback.to_string());
                        match forwarder.send(&target, &message, &token).await {
                            Ok(peer) => {
                                tracing::info!(status = %peer.status, "Follow-up delivered");
                                metrics::record_follow_up("sent");
                            }
                            Err(ExchangeError::Cancelled) => {
                                metrics::record_follow_up("cancelled");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Follow-up failed");
                                metrics::record_follow_up("failed");
                            }
                        }
                    }
                    _ = token.cancelled() => {
                        tracing::warn!("Follow-up abandoned on shutdown");
                        metrics::record_follow_up("cancelled");
                    }
                }
            }
            .instrument(span),
        );
    }
}

/// Accept only absolute http(s) URLs with a host.
fn validate_location(location: &str) -> Result<String, ExchangeError> {
    let invalid = || ExchangeError::InvalidLocation(location.to_string());
    let url = Url::parse(location).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url.into()),
        _ => Err(invalid()),
    }
}

/// Build the router for NF2's single endpoint.
pub fn routes(
    config: &NodeConfig,
    forwarder: Forwarder,
    shutdown: &Shutdown,
    follow_ups: TaskTracker,
) -> Result<Vec<(EndpointConfig, Router)>, NodeError> {
    let endpoint = require_endpoint(NodeKind::Nf2, config, EndpointRole::Nf)?;

    let state = Nf2State {
        forwarder,
        callback_url: own_callback(config, endpoint, NF2_PATH)?.into(),
        remote_override: config.remote_api_root.as_deref().map(Arc::from),
        delay: Duration::from_millis(config.timeouts.follow_up_delay_ms),
        shutdown: shutdown.token(),
        follow_ups,
    };
    tracing::info!(callback = %state.callback_url, delay_ms = state.delay.as_millis() as u64, "NF2 follow-up configured");

    let router = Router::new()
        .route(NF2_PATH, post(nf2_handler))
        .with_state(state);

    Ok(vec![(endpoint.clone(), router)])
}

/// `POST /nf2`: acknowledge, then follow up asynchronously.
async fn nf2_handler(
    State(state): State<Nf2State>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    log_request(&method, &uri, &headers, &body);

    let accepted = LocationMessage::decode(&body).and_then(|inbound| {
        tracing::info!(
            location = %inbound.location,
            time = %inbound.time,
            request_id = %request_id(&headers),
            "Location received"
        );
        state.follow_up_target(&inbound)
    });

    let response = match accepted {
        Ok(target) => {
            state.schedule_follow_up(target);
            tracing::info!("NF2 Handler Completed");
            (StatusCode::OK, ACK_BODY).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected location");
            e.into_response()
        }
    };

    metrics::record_request("nf2", response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpVersion;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn config() -> NodeConfig {
        NodeConfig {
            endpoints: vec![EndpointConfig::new("127.0.0.1:18190", EndpointRole::Nf)],
            local_api_root_prefix: "localhost".to_string(),
            http_version: HttpVersion::Http1,
            ..NodeConfig::default()
        }
    }

    fn build(cfg: &NodeConfig, shutdown: &Shutdown, tracker: TaskTracker) -> Router {
        let forwarder = Forwarder::new(reqwest::Client::new(), NodeKind::Nf2);
        let (_, router) = routes(cfg, forwarder, shutdown, tracker)
            .unwrap()
            .into_iter()
            .next()
            .unwrap();
        router
    }

    fn post(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(NF2_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn location_must_be_absolute_http() {
        assert!(validate_location("http://localhost:8081/nf1").is_ok());
        assert!(validate_location("https://127.0.0.1:8081/nf1").is_ok());
        assert!(validate_location("ftp://localhost/nf1").is_err());
        assert!(validate_location("/nf1").is_err());
        assert!(validate_location("").is_err());
    }

    #[test]
    fn missing_nf_endpoint_is_fatal() {
        let mut cfg = config();
        cfg.endpoints.clear();
        let forwarder = Forwarder::new(reqwest::Client::new(), NodeKind::Nf2);
        assert!(matches!(
            routes(&cfg, forwarder, &Shutdown::new(), TaskTracker::new()),
            Err(NodeError::MissingEndpoint { role: EndpointRole::Nf, .. })
        ));
    }

    #[tokio::test]
    async fn acknowledges_before_follow_up() {
        let shutdown = Shutdown::new();
        let tracker = TaskTracker::new();
        let mut cfg = config();
        cfg.timeouts.follow_up_delay_ms = 60_000;
        let router = build(&cfg, &shutdown, tracker.clone());

        let resp = router
            .oneshot(post(r#"{"location":"http://127.0.0.1:18191/nf1","time":"t"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], ACK_BODY.as_bytes());
        assert_eq!(tracker.len(), 1);

        shutdown.trigger();
        tracker.close();
        tokio::time::timeout(Duration::from_secs(1), tracker.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_bad_input_without_follow_up() {
        let tracker = TaskTracker::new();
        let router = build(&config(), &Shutdown::new(), tracker.clone());

        for body in ["", "{oops", r#"{"location":"not a url","time":"t"}"#] {
            let resp = router.clone().oneshot(post(body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn remote_override_skips_location_check() {
        let shutdown = Shutdown::new();
        let tracker = TaskTracker::new();
        let mut cfg = config();
        cfg.remote_api_root = Some("http://127.0.0.1:18191/nf1".to_string());
        cfg.timeouts.follow_up_delay_ms = 60_000;
        let router = build(&cfg, &shutdown, tracker.clone());

        let resp = router
            .oneshot(post(r#"{"location":"garbage","time":"t"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        shutdown.trigger();
        tracker.close();
        tokio::time::timeout(Duration::from_secs(1), tracker.wait())
            .await
            .unwrap();
    }
}
