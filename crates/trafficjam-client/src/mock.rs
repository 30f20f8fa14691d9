//! Mock Requester for unit testing
//!
//! This module provides a mock implementation of `Requester` that can be used
//! in unit tests without requiring a running TrafficJam instance.
//! Responses are scripted per (method, url) and every issued request is recorded
//! so tests can assert on what was (or was not) sent.

use crate::error::TransportError;
use crate::models::{ApiResponse, HttpMethod, Payload};
use crate::requester_trait::Requester;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub payload: Option<Payload>,
    pub timeout: Duration,
}

/// Mock Requester for testing
///
/// Unscripted routes answer `404` with no body, like a TrafficJam instance that
/// does not know the path.
#[derive(Debug, Clone, Default)]
pub struct MockRequester {
    pub(crate) routes: Arc<Mutex<HashMap<(HttpMethod, String), ApiResponse>>>,
    pub(crate) timeouts: Arc<Mutex<HashSet<(HttpMethod, String)>>>,
    pub(crate) requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockRequester {
    /// Create a new mock requester
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for a route (for test setup)
    pub fn respond(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        status_code: u16,
        response: Option<serde_json::Value>,
    ) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url.into()), ApiResponse::new(status_code, response));
    }

    /// Make a route fail with a timeout (for test setup)
    pub fn time_out(&self, method: HttpMethod, url: impl Into<String>) {
        self.timeouts.lock().unwrap().insert((method, url.into()));
    }

    /// All requests issued so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests issued with the given method
    pub fn count(&self, method: HttpMethod) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

#[async_trait::async_trait]
impl Requester for MockRequester {
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            payload: payload.cloned(),
            timeout,
        });

        let key = (method, url.to_string());
        if self.timeouts.lock().unwrap().contains(&key) {
            return Err(TransportError::Timeout {
                url: url.to_string(),
                timeout,
            });
        }

        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ApiResponse::new(404, None)))
    }
}
