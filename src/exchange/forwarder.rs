//! Outbound POST of a location message to a peer.

use axum::http::{header, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::config::NodeKind;
use crate::exchange::error::ExchangeError;
use crate::exchange::message::LocationMessage;
use crate::observability::metrics;

/// What the peer answered. The body is only logged.
#[derive(Debug, Clone)]
pub struct PeerResponse {
    pub status: StatusCode,
}

/// Sends location messages to peers with a shared, preconfigured client.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    node: NodeKind,
}

impl Forwarder {
    pub fn new(client: reqwest::Client, node: NodeKind) -> Self {
        Self { client, node }
    }

    /// POST `message` to `url` and log the peer's response.
    ///
    /// The call is bounded by the client's timeout and aborted early when
    /// `cancel` fires.
    pub async fn send(
        &self,
        url: &str,
        message: &LocationMessage,
        cancel: &CancellationToken,
    ) -> Result<PeerResponse, ExchangeError> {
        tracing::info!(peer = %url, location = %message.location, time = %message.time, "Sending request to peer");

        let request = self
            .client
            .post(url)
            .header(header::USER_AGENT, self.node.name())
            .header(header::CONTENT_TYPE, "application/json")
            .json(message);

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            tracing::info!(status = %status, "Headers in the response");
            for (name, value) in response.headers() {
                tracing::info!(header = %name, value = ?value, "Response header");
            }
            let body = response.text().await?;
            tracing::info!(body = %body, "Body in the response");
            Ok::<_, reqwest::Error>(PeerResponse { status })
        };

        let result = tokio::select! {
            result = exchange => result,
            _ = cancel.cancelled() => {
                tracing::warn!(peer = %url, "Outbound request cancelled");
                return Err(ExchangeError::Cancelled);
            }
        };

        match result {
            Ok(response) => {
                metrics::record_outbound(response.status.as_u16());
                Ok(response)
            }
            Err(source) => {
                tracing::error!(peer = %url, error = %source, "Outbound request failed");
                metrics::record_outbound(0);
                Err(ExchangeError::Transport {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}
