//! The final, fully-determined options handed to the runtime.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::catalog::{Field, FlagCatalog};
use super::value::{LogEvents, format_duration, serialize_duration, serialize_opt_duration};
use crate::server::{MetricsServerOptions, WebhookServerOptions};

/// Options after flags, caller values and defaults have been merged.
///
/// Every setting holds a definite value. The lease duration, renew deadline
/// and graceful shutdown timeout are optional in the runtime's interface
/// and are always `Some` after a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)] // one field per boolean setting
pub struct ResolvedOptions {
    /// Path to the watches file
    pub watches_file: PathBuf,
    /// Inject owner references into created resources
    pub inject_owner_ref: bool,
    /// Ansible verbosity
    pub ansible_verbosity: i32,
    /// Ansible roles path, empty when unset
    pub ansible_roles_path: String,
    /// Ansible collections path, empty when unset
    pub ansible_collections_path: String,
    /// Extra arguments passed to ansible
    pub ansible_args: String,
    /// Default reconcile period
    #[serde(serialize_with = "serialize_duration")]
    pub reconcile_period: Duration,
    /// Maximum concurrent reconciles per controller
    pub max_concurrent_reconciles: usize,
    /// Health probe bind address
    pub health_probe_bind_address: String,
    /// Leader election enabled
    pub leader_election: bool,
    /// Name of the leader election lock object
    pub leader_election_id: String,
    /// Namespace of the leader election lock object
    pub leader_election_namespace: String,
    /// Resource lock kind used for leader election
    pub leader_election_resource_lock: String,
    /// Leader election lease duration
    #[serde(serialize_with = "serialize_opt_duration")]
    pub lease_duration: Option<Duration>,
    /// Leader election renew deadline
    #[serde(serialize_with = "serialize_opt_duration")]
    pub renew_deadline: Option<Duration>,
    /// Time allowed for runners to exit on shutdown
    #[serde(serialize_with = "serialize_opt_duration")]
    pub graceful_shutdown_timeout: Option<Duration>,
    /// Ansible console event logging
    pub ansible_log_events: LogEvents,
    /// Ansible proxy server port
    pub proxy_port: u16,
    /// HTTP/2 allowed on the webhook and metrics servers
    pub enable_http2: bool,
    /// Metrics served over TLS
    pub secure_metrics: bool,
    /// Metrics endpoint protected with authn/authz
    pub metrics_require_rbac: bool,
    /// Metrics server options
    pub metrics: MetricsServerOptions,
    /// Webhook server options
    pub webhook_server: WebhookServerOptions,
}

impl ResolvedOptions {
    /// Returns the environment variables to export to ansible processes.
    ///
    /// Only settings that declare an environment name and resolved to a
    /// non-empty value are included, so an inherited value stays in effect
    /// when the flag is unset.
    #[must_use]
    pub fn ansible_environment(&self, catalog: &FlagCatalog) -> Vec<(&'static str, String)> {
        catalog
            .iter()
            .filter_map(|setting| {
                let env = setting.env?;
                let value = match setting.field {
                    Field::AnsibleRolesPath => &self.ansible_roles_path,
                    Field::AnsibleCollectionsPath => &self.ansible_collections_path,
                    _ => return None,
                };
                (!value.is_empty()).then(|| (env, value.clone()))
            })
            .collect()
    }
}

impl fmt::Display for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = |d: Option<Duration>| d.map_or_else(|| "none".to_string(), format_duration);

        write!(
            f,
            "Options {{ watches_file: {}, metrics: {}, probe: {}, leader_election: {}, \
             lease: {}, renew: {}, shutdown: {}, reconcile_period: {}, max_reconciles: {}, \
             http2: {}, secure_metrics: {}, rbac: {} }}",
            self.watches_file.display(),
            self.metrics.bind_address,
            self.health_probe_bind_address,
            self.leader_election,
            duration(self.lease_duration),
            duration(self.renew_deadline),
            duration(self.graceful_shutdown_timeout),
            format_duration(self.reconcile_period),
            self.max_concurrent_reconciles,
            self.enable_http2,
            self.secure_metrics,
            self.metrics_require_rbac,
        )
    }
}
