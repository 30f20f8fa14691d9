//! Requester trait for mocking
//!
//! This trait abstracts the HTTP transport so the reconciliation engine can be
//! exercised in unit tests without a running TrafficJam instance.
//! The concrete `TrafficJamClient` implements it, and tests use `MockRequester`.

use crate::error::TransportError;
use crate::models::{ApiResponse, HttpMethod, Payload};
use std::time::Duration;

/// Capability to perform one HTTP exchange against the TrafficJam API
///
/// Every completed exchange is `Ok`, whatever its status code. Only failures
/// that produce no status at all (timeout, refused connection) are `Err`.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Requester: Send + Sync {
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&Payload>,
        timeout: Duration,
    ) -> Result<ApiResponse, TransportError>;
}
