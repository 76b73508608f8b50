//! Precedence resolution between flags, caller options and defaults.
//!
//! For every setting the first matching rule wins:
//!
//! 1. the canonical flag was explicitly set;
//! 2. an alias was explicitly set (aliases in declared order);
//! 3. the caller supplied a value;
//! 4. the catalog default.
//!
//! An explicit flag always beats the caller, but a caller value beats a
//! flag the user never touched.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::catalog::{Field, FlagCatalog, Setting};
use super::defaults;
use super::error::ConfigError;
use super::partial::PartialOptions;
use super::resolved::ResolvedOptions;
use super::tracker::{ChangeTracker, ParsedFlags};
use super::value::{FlagValue, LogEvents, ValueKind};
use crate::server::{MetricsServerOptions, WebhookServerOptions};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Explicitly set via the canonical flag name
    Flag,
    /// Explicitly set via the named alias
    Alias(&'static str),
    /// Supplied by the caller
    Caller,
    /// Compiled-in default
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("flag"),
            Self::Alias(name) => write!(f, "alias:{name}"),
            Self::Caller => f.write_str("caller"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Creates a new resolved value.
    pub const fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Conversion from a flag value into a typed options field.
pub trait FromFlagValue: Sized {
    /// Converts `value`, which belongs to `setting`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has the wrong kind or does not fit.
    fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError>;
}

fn mismatch(setting: &Setting, expected: ValueKind, value: &FlagValue) -> ConfigError {
    ConfigError::TypeMismatch {
        flag: setting.name,
        expected,
        found: value.kind(),
    }
}

impl FromFlagValue for bool {
    fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError> {
        match value {
            FlagValue::Bool(b) => Ok(*b),
            other => Err(mismatch(setting, ValueKind::Bool, other)),
        }
    }
}

impl FromFlagValue for String {
    fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError> {
        match value {
            FlagValue::Str(s) => Ok(s.clone()),
            other => Err(mismatch(setting, ValueKind::Str, other)),
        }
    }
}

impl FromFlagValue for PathBuf {
    fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError> {
        String::from_flag_value(setting, value).map(Self::from)
    }
}

impl FromFlagValue for Duration {
    fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError> {
        match value {
            FlagValue::Duration(d) => Ok(*d),
            other => Err(mismatch(setting, ValueKind::Duration, other)),
        }
    }
}

impl FromFlagValue for LogEvents {
    fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError> {
        String::from_flag_value(setting, value)?.parse()
    }
}

macro_rules! from_int_flag {
    ($($ty:ty),*) => {$(
        impl FromFlagValue for $ty {
            fn from_flag_value(setting: &Setting, value: &FlagValue) -> Result<Self, ConfigError> {
                match value {
                    FlagValue::Int(n) => Self::try_from(*n).map_err(|_| ConfigError::OutOfRange {
                        flag: setting.name,
                        value: *n,
                    }),
                    other => Err(mismatch(setting, ValueKind::Int, other)),
                }
            }
        }
    )*};
}

from_int_flag!(i32, u16, usize);

/// Merges parsed flags and caller options into [`ResolvedOptions`].
#[derive(Debug, Clone, Copy)]
pub struct OptionsMerger<'a> {
    catalog: &'a FlagCatalog,
    tracker: ChangeTracker<'a>,
    flags: Option<&'a ParsedFlags>,
}

impl<'a> OptionsMerger<'a> {
    /// Creates a merger reading explicit flags through `tracker` and their
    /// values from `flags`.
    #[must_use]
    pub const fn new(
        catalog: &'a FlagCatalog,
        tracker: ChangeTracker<'a>,
        flags: Option<&'a ParsedFlags>,
    ) -> Self {
        Self {
            catalog,
            tracker,
            flags,
        }
    }

    /// Creates a merger from a command-line parse result.
    #[must_use]
    pub const fn from_flags(catalog: &'a FlagCatalog, flags: &'a ParsedFlags) -> Self {
        Self::new(catalog, ChangeTracker::new(catalog, flags.explicit()), Some(flags))
    }

    /// Creates a merger with no command-line context. Only caller values
    /// and defaults participate.
    #[must_use]
    pub const fn detached(catalog: &'a FlagCatalog) -> Self {
        Self::new(catalog, ChangeTracker::detached(catalog), None)
    }

    /// Resolves a single setting.
    ///
    /// # Errors
    ///
    /// Returns an error if `field` is not registered or a value cannot be
    /// converted to `T`.
    pub fn resolve<T>(&self, field: Field, caller: Option<T>) -> Result<Resolved<T>, ConfigError>
    where
        T: FromFlagValue + fmt::Debug,
    {
        let setting = self.catalog.setting(field)?;
        let explicit = self.tracker.all_explicit(setting)?;

        let resolved = if let Some(&name) = explicit.first() {
            self.warn_on_conflict(setting, &explicit);
            warn_if_deprecated(setting, name);
            let source = if name == setting.name {
                ValueSource::Flag
            } else {
                ValueSource::Alias(name)
            };
            Resolved::new(T::from_flag_value(setting, self.flag_value(setting, name))?, source)
        } else if let Some(value) = caller {
            Resolved::new(value, ValueSource::Caller)
        } else {
            Resolved::new(
                T::from_flag_value(setting, &setting.default)?,
                ValueSource::Default,
            )
        };

        tracing::debug!(
            flag = setting.name,
            source = %resolved.source,
            value = ?resolved.value,
            "Resolved setting"
        );
        Ok(resolved)
    }

    /// Merges flags, caller values and defaults.
    ///
    /// Security policy is not applied here; see
    /// [`SecurityPolicy`](crate::security::SecurityPolicy).
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is missing a setting or a value
    /// cannot be converted to its field type.
    pub fn merge(&self, caller: PartialOptions) -> Result<ResolvedOptions, ConfigError> {
        if !self.tracker.is_live() {
            tracing::debug!("No command-line context; flags are inert");
        }
        Ok(ResolvedOptions {
            watches_file: self.value(Field::WatchesFile, caller.watches_file)?,
            inject_owner_ref: self.value(Field::InjectOwnerRef, caller.inject_owner_ref)?,
            ansible_verbosity: self.value(Field::AnsibleVerbosity, caller.ansible_verbosity)?,
            ansible_roles_path: self.value(Field::AnsibleRolesPath, caller.ansible_roles_path)?,
            ansible_collections_path: self
                .value(Field::AnsibleCollectionsPath, caller.ansible_collections_path)?,
            ansible_args: self.value(Field::AnsibleArgs, caller.ansible_args)?,
            reconcile_period: self.value(Field::ReconcilePeriod, caller.reconcile_period)?,
            max_concurrent_reconciles: self
                .value(Field::MaxConcurrentReconciles, caller.max_concurrent_reconciles)?,
            health_probe_bind_address: self
                .value(Field::HealthProbeBindAddress, caller.health_probe_bind_address)?,
            leader_election: self.value(Field::LeaderElection, caller.leader_election)?,
            leader_election_id: self.value(Field::LeaderElectionId, caller.leader_election_id)?,
            leader_election_namespace: self
                .value(Field::LeaderElectionNamespace, caller.leader_election_namespace)?,
            leader_election_resource_lock: self
                .resource_lock(caller.leader_election_resource_lock)?,
            lease_duration: Some(self.value(Field::LeaseDuration, caller.lease_duration)?),
            renew_deadline: Some(self.value(Field::RenewDeadline, caller.renew_deadline)?),
            graceful_shutdown_timeout: Some(
                self.value(Field::GracefulShutdownTimeout, caller.graceful_shutdown_timeout)?,
            ),
            ansible_log_events: self.value(Field::AnsibleLogEvents, caller.ansible_log_events)?,
            proxy_port: self.value(Field::ProxyPort, caller.proxy_port)?,
            enable_http2: self.value(Field::EnableHttp2, caller.enable_http2)?,
            secure_metrics: self.value(Field::SecureMetrics, caller.secure_metrics)?,
            metrics_require_rbac: self
                .value(Field::MetricsRequireRbac, caller.metrics_require_rbac)?,
            metrics: MetricsServerOptions {
                bind_address: self
                    .value(Field::MetricsBindAddress, caller.metrics_bind_address)?,
                tls_opts: caller.metrics_tls_opts,
                ..MetricsServerOptions::default()
            },
            webhook_server: WebhookServerOptions {
                tls_opts: caller.webhook_tls_opts,
            },
        })
    }

    fn value<T>(&self, field: Field, caller: Option<T>) -> Result<T, ConfigError>
    where
        T: FromFlagValue + fmt::Debug,
    {
        self.resolve(field, caller).map(|r| r.value)
    }

    /// The resource lock flag is deprecated and never consulted. A caller
    /// value is kept; anything else becomes the only supported kind.
    fn resource_lock(&self, caller: Option<String>) -> Result<String, ConfigError> {
        let setting = self.catalog.setting(Field::LeaderElectionResourceLock)?;
        if let Some(name) = self.tracker.first_explicit(setting)? {
            tracing::warn!(
                "Flag --{name} is ignored; the resource lock is always '{}'",
                defaults::LEASES_RESOURCE_LOCK
            );
        }

        let (lock, source) = match caller.filter(|s| !s.is_empty()) {
            Some(lock) => (lock, ValueSource::Caller),
            None => (
                defaults::LEASES_RESOURCE_LOCK.to_string(),
                ValueSource::Default,
            ),
        };
        tracing::debug!(flag = setting.name, source = %source, value = %lock, "Resolved setting");
        Ok(lock)
    }

    fn flag_value(&self, setting: &'a Setting, name: &str) -> &'a FlagValue {
        self.flags
            .and_then(|flags| flags.value(name))
            .unwrap_or(&setting.default)
    }

    fn warn_on_conflict(&self, setting: &'a Setting, explicit: &[&'static str]) {
        let Some((&winner, rest)) = explicit.split_first() else {
            return;
        };
        let chosen = self.flag_value(setting, winner);
        for &other in rest {
            if self.flag_value(setting, other) != chosen {
                tracing::warn!(
                    "Flags --{winner} and --{other} were both set to different values; using --{winner}={chosen}"
                );
            }
        }
    }
}

fn warn_if_deprecated(setting: &Setting, name: &str) {
    let notice = if name == setting.name {
        setting.deprecated
    } else {
        setting.alias(name).and_then(|a| a.deprecated)
    };
    if let Some(notice) = notice {
        tracing::warn!("Flag --{name} has been deprecated, {notice}");
    }
}
