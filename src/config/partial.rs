//! Caller-supplied partial options.
//!
//! Embedding code sets the fields it has an opinion about and leaves the
//! rest as `None`. A `Some` value, even a zero or empty one, counts as
//! supplied. The same structure can be loaded from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use super::ConfigError;
use super::value::{LogEvents, parse_duration};
use crate::server::TlsOption;

/// Options provided by the caller before flags are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialOptions {
    /// Path to the watches file
    pub watches_file: Option<PathBuf>,
    /// Inject owner references into created resources
    pub inject_owner_ref: Option<bool>,
    /// Ansible verbosity
    pub ansible_verbosity: Option<i32>,
    /// Ansible roles path
    pub ansible_roles_path: Option<String>,
    /// Ansible collections path
    pub ansible_collections_path: Option<String>,
    /// Extra arguments passed to ansible
    pub ansible_args: Option<String>,
    /// Default reconcile period
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub reconcile_period: Option<Duration>,
    /// Maximum concurrent reconciles per controller
    pub max_concurrent_reconciles: Option<usize>,
    /// Metrics endpoint bind address
    pub metrics_bind_address: Option<String>,
    /// Health probe bind address
    pub health_probe_bind_address: Option<String>,
    /// Enable leader election
    pub leader_election: Option<bool>,
    /// Name of the leader election lock object
    pub leader_election_id: Option<String>,
    /// Namespace of the leader election lock object
    pub leader_election_namespace: Option<String>,
    /// Resource lock kind; anything empty resolves to `leases`
    pub leader_election_resource_lock: Option<String>,
    /// Leader election lease duration
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub lease_duration: Option<Duration>,
    /// Leader election renew deadline
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub renew_deadline: Option<Duration>,
    /// Time allowed for runners to exit on shutdown
    #[serde(default, deserialize_with = "deserialize_opt_duration")]
    pub graceful_shutdown_timeout: Option<Duration>,
    /// Ansible console event logging
    pub ansible_log_events: Option<LogEvents>,
    /// Ansible proxy server port
    pub proxy_port: Option<u16>,
    /// Allow HTTP/2 on the webhook and metrics servers
    pub enable_http2: Option<bool>,
    /// Serve metrics over TLS
    pub secure_metrics: Option<bool>,
    /// Protect the metrics endpoint with authn/authz
    pub metrics_require_rbac: Option<bool>,
    /// TLS options already installed on the metrics server
    #[serde(default)]
    pub metrics_tls_opts: Vec<TlsOption>,
    /// TLS options already installed on the webhook server
    #[serde(default)]
    pub webhook_tls_opts: Vec<TlsOption>,
}

impl PartialOptions {
    /// Loads partial options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses partial options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
        .transpose()
}
