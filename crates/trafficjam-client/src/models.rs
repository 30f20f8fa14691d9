//! TrafficJam wire models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// HTTP methods used against the TrafficJam API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request payload: a flat mapping of wire key to value
pub type Payload = Map<String, Value>;

/// Result of one completed HTTP exchange
///
/// `response` is `None` when the body was empty or was not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status_code: u16,
    pub response: Option<Value>,
}

impl ApiResponse {
    pub fn new(status_code: u16, response: Option<Value>) -> Self {
        Self {
            status_code,
            response,
        }
    }
}

/// How a request payload is put on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadEncoding {
    /// URL query parameters (what the TrafficJam service reads)
    #[default]
    Query,
    /// JSON request body
    Json,
}
