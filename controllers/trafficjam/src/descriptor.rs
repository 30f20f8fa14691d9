//! Resource descriptors
//!
//! A descriptor is the caller's desired state for exactly one TrafficJam
//! resource. It is deserialized from the front end's YAML and never persisted.

use crate::model::{API_BASE_PATH, ResourceKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// What the caller wants for the resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Read only, never changes anything
    #[default]
    Query,
    /// Create or update
    Present,
    /// Delete
    Absent,
}

impl DesiredState {
    /// Lowercase name, as written in descriptors
    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Query => "query",
            DesiredState::Present => "present",
            DesiredState::Absent => "absent",
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the TrafficJam instance lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Address for the TrafficJam instance
    pub host: String,

    /// HTTP port (default: 80)
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_port() -> u16 {
    80
}

fn default_timeout() -> u64 {
    10
}

impl Connection {
    /// Connection with the default port and timeout
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            timeout: default_timeout(),
        }
    }

    /// Base URL of the API, e.g. `http://trafficjam:80/trafficjam/api`
    pub fn api_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, API_BASE_PATH)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Field name to value mapping from the descriptor's `config` block
///
/// A key mapped to `null` is treated exactly like a missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    /// No fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, `None` when missing or null
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Whether a field carries a value
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Fields that carry a value, in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Every supplied key, including those set to null
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// No field carries a value
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Desired state for one TrafficJam resource
///
/// Deserialization rejects unknown top-level keys, so a misspelled `state`
/// fails instead of silently falling back to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDescriptor")]
pub struct ResourceDescriptor {
    /// Resource kind selector
    pub kind: ResourceKind,

    /// Desired state (default: query)
    #[serde(rename = "state")]
    pub desired_state: DesiredState,

    /// Address the kind's subinterfaces instead of the kind itself
    pub subinterface: bool,

    /// Host, port and timeout, flattened into the top level
    #[serde(flatten)]
    pub connection: Connection,

    /// Field values from the `config` block
    #[serde(rename = "config")]
    pub fields: Fields,
}

// Flat wire shape; `deny_unknown_fields` does not combine with `flatten`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptor {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_timeout")]
    timeout: u64,
    kind: ResourceKind,
    #[serde(default)]
    state: DesiredState,
    #[serde(default)]
    subinterface: bool,
    #[serde(default)]
    config: Fields,
}

impl From<RawDescriptor> for ResourceDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        Self {
            kind: raw.kind,
            desired_state: raw.state,
            subinterface: raw.subinterface,
            connection: Connection {
                host: raw.host,
                port: raw.port,
                timeout: raw.timeout,
            },
            fields: raw.config,
        }
    }
}

impl ResourceDescriptor {
    /// Descriptor with no fields
    pub fn new(kind: ResourceKind, desired_state: DesiredState, connection: Connection) -> Self {
        Self {
            kind,
            desired_state,
            subinterface: false,
            connection,
            fields: Fields::new(),
        }
    }

    /// Builder: set a field
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    /// Builder: set the subinterface flag
    pub fn with_subinterface(mut self, subinterface: bool) -> Self {
        self.subinterface = subinterface;
        self
    }

    /// Whether the descriptor addresses a child collection of its kind
    pub fn targets_subinterface(&self) -> bool {
        self.subinterface && self.kind.model().subinterfaces.is_some()
    }
}
