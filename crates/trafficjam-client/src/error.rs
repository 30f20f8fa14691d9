//! TrafficJam transport errors

use std::time::Duration;
use thiserror::Error;

/// Errors that prevent a request from producing any HTTP status at all.
///
/// A response with a non-2xx status is *not* a transport error: it is returned
/// as an [`ApiResponse`](crate::ApiResponse) and classified by the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("request to {url} timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    /// The TrafficJam host could not be reached (refused, DNS, TLS)
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other HTTP-level failure (malformed URL, broken body stream, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Classify a reqwest failure for the request that produced it
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if err.is_connect() {
            Self::Connect {
                url: url.to_string(),
                source: err,
            }
        } else {
            Self::Http(err)
        }
    }

    /// Whether the failure was a timeout expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
