//! Default values for every recognized setting.
//!
//! Centralized constants to avoid magic values scattered across the catalog
//! and the merger.

use std::num::NonZeroUsize;
use std::time::Duration;

/// Default path to the watches file.
pub const WATCHES_FILE: &str = "./watches.yaml";

/// Owner references are injected unless disabled.
pub const INJECT_OWNER_REF: bool = true;

/// Default ansible verbosity.
pub const ANSIBLE_VERBOSITY: i64 = 2;

/// Default reconcile period in seconds (10 hours).
pub const RECONCILE_PERIOD_SECS: u64 = 10 * 60 * 60;

/// Default metrics endpoint bind address.
pub const METRICS_BIND_ADDRESS: &str = ":8443";

/// Default health probe bind address.
pub const HEALTH_PROBE_BIND_ADDRESS: &str = ":6789";

/// Default of the deprecated resource lock flag. Never used for resolution.
pub const LEADER_ELECT_RESOURCE_LOCK: &str = "configmapsleases";

/// The only resource lock kind supported by the leader election client.
pub const LEASES_RESOURCE_LOCK: &str = "leases";

/// Default leader election lease duration in seconds.
pub const LEASE_DURATION_SECS: u64 = 15;

/// Default leader election renew deadline in seconds.
pub const RENEW_DEADLINE_SECS: u64 = 10;

/// Default graceful shutdown timeout in seconds.
pub const GRACEFUL_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default ansible log events level.
pub const ANSIBLE_LOG_EVENTS: &str = "tasks";

/// Default ansible proxy server port.
pub const PROXY_PORT: i64 = 8888;

/// Environment variable exported for the ansible roles path.
pub const ANSIBLE_ROLES_PATH_ENV: &str = "ANSIBLE_ROLES_PATH";

/// Environment variable exported for the ansible collections path.
pub const ANSIBLE_COLLECTIONS_PATH_ENV: &str = "ANSIBLE_COLLECTIONS_PATH";

/// Default reconcile period as Duration.
#[must_use]
pub const fn reconcile_period() -> Duration {
    Duration::from_secs(RECONCILE_PERIOD_SECS)
}

/// Default lease duration as Duration.
#[must_use]
pub const fn lease_duration() -> Duration {
    Duration::from_secs(LEASE_DURATION_SECS)
}

/// Default renew deadline as Duration.
#[must_use]
pub const fn renew_deadline() -> Duration {
    Duration::from_secs(RENEW_DEADLINE_SECS)
}

/// Default graceful shutdown timeout as Duration.
#[must_use]
pub const fn graceful_shutdown_timeout() -> Duration {
    Duration::from_secs(GRACEFUL_SHUTDOWN_TIMEOUT_SECS)
}

/// Default maximum concurrent reconciles: the number of available
/// processing units, or 1 if that cannot be determined.
#[must_use]
pub fn max_concurrent_reconciles() -> i64 {
    let cpus = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    i64::try_from(cpus).unwrap_or(i64::MAX)
}
