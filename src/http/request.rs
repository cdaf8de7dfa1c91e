//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Dump received requests to the log before handlers act on them

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer assigning `x-request-id` to requests that lack one.
pub fn set_request_id() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying `x-request-id` onto the response.
pub fn propagate_request_id() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// The request ID assigned by [`set_request_id`], or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Log the full inbound request.
pub fn log_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
    tracing::info!(
        request_id = %request_id(headers),
        method = %method,
        uri = %uri,
        body = %String::from_utf8_lossy(body),
        "Request received"
    );
    for (name, value) in headers {
        tracing::debug!(header = %name, value = ?value, "Request header");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn request_id_falls_back_to_unknown() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
    }
}
