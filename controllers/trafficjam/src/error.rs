//! Reconciler error types.
//!
//! Only transport failures and internal planning gaps are returned as `Err`.
//! Validation, duplicate and remote failures are resolved into a failed
//! [`ReconciliationOutcome`](crate::ReconciliationOutcome) and use the types
//! here to build its message.

use crate::descriptor::DesiredState;
use crate::model::ResourceKind;
use std::path::PathBuf;
use thiserror::Error;
use trafficjam_client::{HttpMethod, TransportError};

/// Errors that abort a reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The TrafficJam instance could not be reached or did not answer in time
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A validated descriptor matched no planning branch
    #[error("No request plan for {kind} (state: {state}, subinterface: {subinterface}); descriptor passed validation")]
    NoMatchingRule {
        kind: ResourceKind,
        state: DesiredState,
        subinterface: bool,
    },
}

/// A descriptor violates a consistency rule. No request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// The existence guard found the resource before creating it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{label} already exists")]
pub struct DuplicateResourceError {
    pub label: &'static str,
    pub key: &'static str,
    pub value: serde_json::Value,
}

/// TrafficJam answered a well-formed request with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {url} returned {status_code}")]
pub struct RemoteOperationError {
    pub method: HttpMethod,
    pub url: String,
    pub status_code: u16,
}

/// Errors loading the front end's configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No descriptor path on the command line or in the environment
    #[error("Invalid configuration: TRAFFICJAM_DESCRIPTOR environment variable or a descriptor path argument is required")]
    MissingDescriptor,

    /// The descriptor file could not be read
    #[error("Failed to read descriptor {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The descriptor is not valid YAML for a resource descriptor
    #[error("Failed to parse descriptor: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// An override variable has an unusable value
    #[error("Invalid configuration: {var}={value}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}
