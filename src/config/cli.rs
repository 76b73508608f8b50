//! CLI argument parsing using clap.
//!
//! Every setting is an `Option` so that "not on the command line" stays
//! distinguishable from "set to the default". [`Cli::parsed_flags`] turns
//! the parse result into [`ParsedFlags`] keyed by flag name.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::BoolishValueParser;

use super::tracker::ParsedFlags;
use super::value::{LogEvents, parse_duration};

/// Operator flags: resolve runtime options for an ansible-based operator
///
/// Merges command-line flags with an optional options file and built-in
/// defaults, then prints the resolved options as JSON.
#[derive(Debug, Parser)]
#[command(name = "operator-flags")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML file with caller-supplied options; explicit flags override it
    #[arg(long = "options-file", value_name = "PATH")]
    pub options_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    #[command(flatten)]
    pub flags: OperatorFlags,
}

/// Flags recognized by the operator.
#[derive(Debug, Default, clap::Args)]
pub struct OperatorFlags {
    /// Path to the watches file to use [default: ./watches.yaml]
    #[arg(long = "watches-file", value_name = "PATH")]
    pub watches_file: Option<String>,

    /// The ansible operator will inject owner references unless this flag is false [default: true]
    #[arg(long = "inject-owner-ref", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub inject_owner_ref: Option<bool>,

    /// Ansible verbosity. Overridden by environment variable [default: 2]
    #[arg(long = "ansible-verbosity", allow_negative_numbers = true)]
    pub ansible_verbosity: Option<i64>,

    /// Ansible roles path. If unset, roles are assumed to be in {{CWD}}/roles
    #[arg(long = "ansible-roles-path", value_name = "PATH")]
    pub ansible_roles_path: Option<String>,

    /// Path to installed Ansible Collections. If unset, collections are assumed
    /// to be in ~/.ansible/collections or /usr/share/ansible/collections
    #[arg(long = "ansible-collections-path", value_name = "PATH")]
    pub ansible_collections_path: Option<String>,

    /// Arbitrary arguments for ansible-based operators
    #[arg(long = "ansible-args", allow_hyphen_values = true)]
    pub ansible_args: Option<String>,

    /// Default reconcile period for controllers [default: 10h]
    #[arg(long = "reconcile-period", value_parser = parse_duration)]
    pub reconcile_period: Option<Duration>,

    /// Maximum number of concurrent reconciles for controllers [default: number of CPUs]
    #[arg(long = "max-concurrent-reconciles", allow_negative_numbers = true)]
    pub max_concurrent_reconciles: Option<i64>,

    /// The address the metric endpoint binds to [default: :8443]
    #[arg(long = "metrics-bind-address", value_name = "ADDR")]
    pub metrics_bind_address: Option<String>,

    /// Deprecated: use --metrics-bind-address instead
    #[arg(long = "metrics-addr", value_name = "ADDR", hide = true)]
    pub metrics_addr: Option<String>,

    /// The address the probe endpoint binds to [default: :6789]
    #[arg(long = "health-probe-bind-address", value_name = "ADDR")]
    pub health_probe_bind_address: Option<String>,

    /// Enable leader election for controller manager, ensuring there is only
    /// one active controller manager
    #[arg(long = "leader-elect", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub leader_elect: Option<bool>,

    /// Deprecated: use --leader-elect instead
    #[arg(long = "enable-leader-election", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = BoolishValueParser::new(), hide = true)]
    pub enable_leader_election: Option<bool>,

    /// Name of the configmap that is used for holding the leader lock
    #[arg(long = "leader-election-id")]
    pub leader_election_id: Option<String>,

    /// Namespace in which to create the leader election configmap for holding
    /// the leader lock (required if running locally with leader election enabled)
    #[arg(long = "leader-election-namespace")]
    pub leader_election_namespace: Option<String>,

    /// Deprecated: the resource lock is always 'leases'
    #[arg(long = "leader-elect-resource-lock", hide = true)]
    pub leader_elect_resource_lock: Option<String>,

    /// Duration that non-leader candidates will wait to force acquire leadership [default: 15s]
    #[arg(long = "leader-elect-lease-duration", value_parser = parse_duration)]
    pub leader_elect_lease_duration: Option<Duration>,

    /// Duration that the acting leader will retry refreshing leadership before giving up [default: 10s]
    #[arg(long = "leader-elect-renew-deadline", value_parser = parse_duration)]
    pub leader_elect_renew_deadline: Option<Duration>,

    /// Time spent waiting for runners to gracefully exit [default: 30s]
    #[arg(long = "graceful-shutdown-timeout", value_parser = parse_duration)]
    pub graceful_shutdown_timeout: Option<Duration>,

    /// Ansible console log level: Nothing, Tasks, or Everything [default: tasks]
    #[arg(long = "ansible-log-events", value_parser = str::parse::<LogEvents>)]
    pub ansible_log_events: Option<LogEvents>,

    /// Ansible proxy server port [default: 8888]
    #[arg(long = "proxy-port")]
    pub proxy_port: Option<i64>,

    /// Enables HTTP/2 on the webhook and metrics servers
    #[arg(long = "enable-http2", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub enable_http2: Option<bool>,

    /// Enables secure serving of the metrics endpoint
    #[arg(long = "metrics-secure", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub metrics_secure: Option<bool>,

    /// Enables protection of the metrics endpoint with RBAC-based authn/authz
    #[arg(long = "metrics-require-rbac", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_parser = BoolishValueParser::new())]
    pub metrics_require_rbac: Option<bool>,
}

impl OperatorFlags {
    /// Converts the parse result into flag values keyed by flag name.
    ///
    /// Only flags that appeared on the command line are recorded, so the
    /// result's explicit set is exactly what the user typed.
    #[must_use]
    pub fn parsed_flags(&self) -> ParsedFlags {
        let mut parsed = ParsedFlags::new();

        parsed.set_opt("watches-file", self.watches_file.clone());
        parsed.set_opt("inject-owner-ref", self.inject_owner_ref);
        parsed.set_opt("ansible-verbosity", self.ansible_verbosity);
        parsed.set_opt("ansible-roles-path", self.ansible_roles_path.clone());
        parsed.set_opt("ansible-collections-path", self.ansible_collections_path.clone());
        parsed.set_opt("ansible-args", self.ansible_args.clone());
        parsed.set_opt("reconcile-period", self.reconcile_period);
        parsed.set_opt("max-concurrent-reconciles", self.max_concurrent_reconciles);
        parsed.set_opt("metrics-bind-address", self.metrics_bind_address.clone());
        parsed.set_opt("metrics-addr", self.metrics_addr.clone());
        parsed.set_opt("health-probe-bind-address", self.health_probe_bind_address.clone());
        parsed.set_opt("leader-elect", self.leader_elect);
        parsed.set_opt("enable-leader-election", self.enable_leader_election);
        parsed.set_opt("leader-election-id", self.leader_election_id.clone());
        parsed.set_opt("leader-election-namespace", self.leader_election_namespace.clone());
        parsed.set_opt("leader-elect-resource-lock", self.leader_elect_resource_lock.clone());
        parsed.set_opt("leader-elect-lease-duration", self.leader_elect_lease_duration);
        parsed.set_opt("leader-elect-renew-deadline", self.leader_elect_renew_deadline);
        parsed.set_opt("graceful-shutdown-timeout", self.graceful_shutdown_timeout);
        parsed.set_opt("ansible-log-events", self.ansible_log_events.map(LogEvents::as_str));
        parsed.set_opt("proxy-port", self.proxy_port);
        parsed.set_opt("enable-http2", self.enable_http2);
        parsed.set_opt("metrics-secure", self.metrics_secure);
        parsed.set_opt("metrics-require-rbac", self.metrics_require_rbac);

        parsed
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Converts the operator flags into [`ParsedFlags`].
    #[must_use]
    pub fn parsed_flags(&self) -> ParsedFlags {
        self.flags.parsed_flags()
    }
}
