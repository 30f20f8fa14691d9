//! TrafficJam API client
//!
//! Implements the `Requester` transport on top of reqwest.
//! The TrafficJam service reads parameters from the query string, so payloads
//! are sent as query parameters unless JSON encoding is selected.

use crate::error::TransportError;
use crate::models::{ApiResponse, HttpMethod, Payload, PayloadEncoding};
use crate::requester_trait::Requester;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// TrafficJam API client
#[derive(Debug, Clone)]
pub struct TrafficJamClient {
    client: Client,
    encoding: PayloadEncoding,
}

impl TrafficJamClient {
    /// Create a new client that sends payloads as query parameters
    pub fn new() -> Result<Self, TransportError> {
        Self::with_encoding(PayloadEncoding::default())
    }

    /// Create a new client with an explicit payload encoding
    ///
    /// No client-wide timeout is set: every request carries the timeout of the
    /// descriptor it was planned from.
    pub fn with_encoding(encoding: PayloadEncoding) -> Result<Self, TransportError> {
        let client = Client::builder().build().map_err(TransportError::Http)?;

        Ok(Self { client, encoding })
    }

    /// Get the payload encoding
    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }
}

#[async_trait::async_trait]
impl Requester for TrafficJamClient {
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(method.into(), url)
            .timeout(timeout)
            .header("Accept", "application/json");

        if let Some(payload) = payload {
            let logged = serde_json::Value::Object(payload.clone());
            debug!("{} {} with payload: {}", method, url, logged);
            builder = match self.encoding {
                PayloadEncoding::Query => builder.query(&query_pairs(payload)),
                PayloadEncoding::Json => builder.json(payload),
            };
        } else {
            debug!("{} {}", method, url);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;

        let status_code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;

        debug!("{} {} returned {} ({} bytes)", method, url, status_code, body.len());

        Ok(ApiResponse::new(status_code, decode_body(&body)))
    }
}

/// Flatten a payload into query pairs
///
/// Null values are dropped. Strings are sent verbatim, scalars via their JSON
/// text and nested values as compact JSON.
pub(crate) fn query_pairs(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// Decode a response body, treating empty or non-JSON bodies as absent
pub(crate) fn decode_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }

    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Response body is not JSON, dropping it: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_drops_nulls() {
        let payload = json!({
            "name": "test_bridge",
            "vrf_id": 3,
            "description": null,
        });
        let pairs = query_pairs(payload.as_object().unwrap());

        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("name".to_string(), "test_bridge".to_string())));
        assert!(pairs.contains(&("vrf_id".to_string(), "3".to_string())));
    }

    #[test]
    fn test_decode_body_empty_is_none() {
        assert_eq!(decode_body(b""), None);
    }

    #[test]
    fn test_decode_body_html_is_none() {
        assert_eq!(decode_body(b"<html>Internal Server Error</html>"), None);
    }

    #[test]
    fn test_decode_body_array() {
        let decoded = decode_body(br#"[{"name": "br0"}]"#);
        assert_eq!(decoded, Some(json!([{"name": "br0"}])));
    }
}
