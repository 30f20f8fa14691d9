//! Front-end configuration
//!
//! The binary reads the descriptor path and connection overrides from
//! environment variables. Loading goes through a lookup function so tests do
//! not have to touch the process environment.

use crate::descriptor::ResourceDescriptor;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use trafficjam_client::PayloadEncoding;

/// Path to the YAML descriptor
pub const DESCRIPTOR_VAR: &str = "TRAFFICJAM_DESCRIPTOR";
/// Overrides `host`
pub const HOST_VAR: &str = "TRAFFICJAM_HOST";
/// Overrides `port`
pub const PORT_VAR: &str = "TRAFFICJAM_PORT";
/// Overrides `timeout` (seconds)
pub const TIMEOUT_VAR: &str = "TRAFFICJAM_TIMEOUT";
/// `query` (default) or `json`
pub const PAYLOAD_ENCODING_VAR: &str = "TRAFFICJAM_PAYLOAD_ENCODING";

/// Settings for one run of the binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Descriptor file to reconcile
    pub descriptor_path: PathBuf,
    /// Connection overrides applied after the descriptor is loaded
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout: Option<u64>,
    /// How request parameters are sent
    pub payload_encoding: PayloadEncoding,
}

impl Config {
    /// Load from the process environment; `arg` (first CLI argument) wins over
    /// `TRAFFICJAM_DESCRIPTOR`
    pub fn from_env(arg: Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(arg, |var| std::env::var(var).ok())
    }

    /// Load through `lookup`; blank values count as unset
    pub fn from_lookup<F>(arg: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let descriptor_path = arg
            .filter(|a| !a.is_empty())
            .or_else(|| lookup(DESCRIPTOR_VAR))
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingDescriptor)?;

        let payload_encoding = match lookup(PAYLOAD_ENCODING_VAR) {
            None => PayloadEncoding::default(),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "query" => PayloadEncoding::Query,
                "json" => PayloadEncoding::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: PAYLOAD_ENCODING_VAR,
                        value,
                        reason: "expected query or json".to_string(),
                    });
                }
            },
        };

        Ok(Self {
            descriptor_path,
            host: lookup(HOST_VAR),
            port: parse_var(PORT_VAR, lookup(PORT_VAR))?,
            timeout: parse_var(TIMEOUT_VAR, lookup(TIMEOUT_VAR))?,
            payload_encoding,
        })
    }

    /// Read the descriptor file and apply the connection overrides
    pub fn load_descriptor(&self) -> Result<ResourceDescriptor, ConfigError> {
        let mut descriptor = load_descriptor(&self.descriptor_path)?;
        self.apply_overrides(&mut descriptor);
        Ok(descriptor)
    }

    /// Replace the descriptor's connection settings with any overrides
    pub fn apply_overrides(&self, descriptor: &mut ResourceDescriptor) {
        if let Some(host) = &self.host {
            descriptor.connection.host = host.clone();
        }
        if let Some(port) = self.port {
            descriptor.connection.port = port;
        }
        if let Some(timeout) = self.timeout {
            descriptor.connection.timeout = timeout;
        }
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                var,
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Parse a YAML descriptor
pub fn parse_descriptor(yaml: &str) -> Result<ResourceDescriptor, ConfigError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse a YAML descriptor file
pub fn load_descriptor(path: &Path) -> Result<ResourceDescriptor, ConfigError> {
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_descriptor(&yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DesiredState;
    use crate::model::ResourceKind;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_descriptor_path_required() {
        let err = Config::from_lookup(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDescriptor));
    }

    #[test]
    fn test_argument_wins_over_env() {
        let config = Config::from_lookup(
            Some("/tmp/arg.yaml".to_string()),
            env(&[(DESCRIPTOR_VAR, "/tmp/env.yaml")]),
        )
        .unwrap();
        assert_eq!(config.descriptor_path, PathBuf::from("/tmp/arg.yaml"));
        assert_eq!(config.payload_encoding, PayloadEncoding::Query);
    }

    #[test]
    fn test_overrides_parsed() {
        let config = Config::from_lookup(
            None,
            env(&[
                (DESCRIPTOR_VAR, "/tmp/d.yaml"),
                (HOST_VAR, "10.0.0.5"),
                (PORT_VAR, "8080"),
                (TIMEOUT_VAR, "3"),
                (PAYLOAD_ENCODING_VAR, "JSON"),
            ]),
        )
        .unwrap();

        assert_eq!(config.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.timeout, Some(3));
        assert_eq!(config.payload_encoding, PayloadEncoding::Json);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(
            None,
            env(&[(DESCRIPTOR_VAR, "/tmp/d.yaml"), (PORT_VAR, "eighty")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: PORT_VAR, .. }));
    }

    #[test]
    fn test_invalid_encoding() {
        let err = Config::from_lookup(
            None,
            env(&[(DESCRIPTOR_VAR, "/tmp/d.yaml"), (PAYLOAD_ENCODING_VAR, "form")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected query or json"));
    }

    #[test]
    fn test_apply_overrides() {
        let config = Config::from_lookup(
            None,
            env(&[(DESCRIPTOR_VAR, "/tmp/d.yaml"), (HOST_VAR, "tj.lab"), (TIMEOUT_VAR, "30")]),
        )
        .unwrap();
        let mut descriptor = parse_descriptor("host: trafficjam\nport: 8000\nkind: vrf\n").unwrap();
        config.apply_overrides(&mut descriptor);

        assert_eq!(descriptor.connection.host, "tj.lab");
        assert_eq!(descriptor.connection.port, 8000);
        assert_eq!(descriptor.connection.timeout, 30);
    }

    #[test]
    fn test_parse_descriptor() {
        let descriptor = parse_descriptor(
            "host: trafficjam\nkind: vrf\nstate: present\nconfig:\n  vrf_name: testvrf\n  vrf_table_id: 111\n",
        )
        .unwrap();
        assert_eq!(descriptor.kind, ResourceKind::Vrf);
        assert_eq!(descriptor.desired_state, DesiredState::Present);
        assert!(descriptor.fields.has("vrf_table_id"));
    }

    #[test]
    fn test_parse_descriptor_rejects_unknown_kind() {
        let err = parse_descriptor("host: trafficjam\nkind: tunnel\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_descriptor_rejects_misspelled_state() {
        let err = parse_descriptor(
            "host: trafficjam\nkind: bridge\nstat: present\nconfig:\n  name: br0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("stat"), "got: {}", err);
    }

    #[test]
    fn test_missing_file() {
        let err = load_descriptor(Path::new("/nonexistent/descriptor.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
