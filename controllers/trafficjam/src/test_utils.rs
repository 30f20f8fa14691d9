//! Test utilities for unit testing the engine
//!
//! Helpers for building descriptors against the `trafficjam` host used by every
//! test, and for scripting a mock TrafficJam instance.

#[cfg(test)]
use crate::descriptor::{Connection, DesiredState, ResourceDescriptor};
#[cfg(test)]
use crate::model::ResourceKind;
#[cfg(test)]
use crate::reconciler::Reconciler;
#[cfg(test)]
use trafficjam_client::MockRequester;

/// Base URL every test descriptor resolves to
#[cfg(test)]
pub const API: &str = "http://trafficjam:80/trafficjam/api";

/// Descriptor for `kind` on host `trafficjam`, default port and timeout
#[cfg(test)]
pub fn descriptor(kind: ResourceKind, state: DesiredState) -> ResourceDescriptor {
    ResourceDescriptor::new(kind, state, Connection::new("trafficjam"))
}

/// Full URL below the API base
#[cfg(test)]
pub fn url(path: &str) -> String {
    format!("{}/{}", API, path)
}

/// Reconciler over a fresh mock; the returned handle shares its state
#[cfg(test)]
pub fn create_test_reconciler() -> (Reconciler, MockRequester) {
    let mock = MockRequester::new();
    (Reconciler::new(mock.clone()), mock)
}
