//! Wire message exchanged between the nodes.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::exchange::error::ExchangeError;

/// `{ "location": <url>, "time": <timestamp> }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocationMessage {
    /// Callback URL of the sender.
    pub location: String,
    /// When the sender built the message.
    pub time: String,
}

impl LocationMessage {
    /// A message pointing at `location`, stamped with the current time.
    pub fn now(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            time: timestamp(),
        }
    }

    /// Decode an inbound request body.
    ///
    /// Empty bodies are rejected before serde sees them. Decode failures are
    /// logged with the raw error; callers only get the generic variant.
    pub fn decode(body: &Bytes) -> Result<Self, ExchangeError> {
        if body.is_empty() {
            tracing::warn!("Empty body");
            return Err(ExchangeError::EmptyBody);
        }

        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(error = %e, "Body parse error");
            ExchangeError::Decode
        })
    }
}

/// Current local time, RFC 3339 with microseconds.
pub fn timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_both_fields() {
        let body = Bytes::from_static(br#"{"location":"https://localhost:8081/nf1","time":"t1"}"#);
        let msg = LocationMessage::decode(&body).unwrap();
        assert_eq!(msg.location, "https://localhost:8081/nf1");
        assert_eq!(msg.time, "t1");
    }

    #[test]
    fn encode_then_decode_is_lossless() {
        let msg = LocationMessage::now("http://127.0.0.1:8090/nf2");
        let bytes = Bytes::from(serde_json::to_vec(&msg).unwrap());
        assert_eq!(LocationMessage::decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn empty_and_malformed_bodies_are_rejected() {
        assert!(matches!(
            LocationMessage::decode(&Bytes::new()),
            Err(ExchangeError::EmptyBody)
        ));
        assert!(matches!(
            LocationMessage::decode(&Bytes::from_static(b"{\"location\":")),
            Err(ExchangeError::Decode)
        ));
        assert!(matches!(
            LocationMessage::decode(&Bytes::from_static(br#"{"location":"x"}"#)),
            Err(ExchangeError::Decode)
        ));
    }

    #[test]
    fn timestamp_is_rfc3339() {
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp()).is_ok());
    }
}
