//! Per-request error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that end the handling of a single request.
///
/// Only the status code and a generic body reach the caller; details stay in
/// the log.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Request carried no body.
    #[error("empty request body")]
    EmptyBody,

    /// Body was not a valid location message.
    #[error("malformed request body")]
    Decode,

    /// Inbound location is not an absolute http(s) URL.
    #[error("invalid location '{0}'")]
    InvalidLocation(String),

    /// Outbound call failed, including TLS trust failures.
    #[error("outbound request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// Peer answered the outbound call with a non-success status.
    #[error("peer rejected the request with {0}")]
    PeerRejected(StatusCode),

    /// Request or process cancellation hit a suspend point.
    #[error("request cancelled")]
    Cancelled,

    /// Correlated follow-up did not arrive in time.
    #[error("timed out after {0:?} waiting for peer")]
    TimedOut(std::time::Duration),
}

impl ExchangeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExchangeError::EmptyBody | ExchangeError::Decode | ExchangeError::InvalidLocation(_) => {
                StatusCode::BAD_REQUEST
            }
            ExchangeError::Transport { .. } | ExchangeError::PeerRejected(_) => StatusCode::BAD_GATEWAY,
            ExchangeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ExchangeError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Body returned to the caller.
    fn public_message(&self) -> &'static str {
        match self {
            ExchangeError::EmptyBody => "Empty request body",
            ExchangeError::Decode => "Malformed request body",
            ExchangeError::InvalidLocation(_) => "Invalid location",
            ExchangeError::Transport { .. } | ExchangeError::PeerRejected(_) => "Upstream request failed",
            ExchangeError::Cancelled => "request cancelled",
            ExchangeError::TimedOut(_) => "Timed out waiting for peer",
        }
    }
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
