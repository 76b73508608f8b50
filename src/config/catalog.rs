//! The flag catalog: every recognized setting and its names.
//!
//! Each [`Setting`] has one canonical name and an ordered list of aliases.
//! Aliases resolve exactly like the canonical name; the order in which they
//! are declared is the order in which the merger consults them.

use std::collections::HashMap;
use std::time::Duration;

use super::defaults;
use super::error::ConfigError;
use super::value::{FlagValue, ValueKind};

/// The options field a setting resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    WatchesFile,
    InjectOwnerRef,
    AnsibleVerbosity,
    AnsibleRolesPath,
    AnsibleCollectionsPath,
    AnsibleArgs,
    ReconcilePeriod,
    MaxConcurrentReconciles,
    MetricsBindAddress,
    HealthProbeBindAddress,
    LeaderElection,
    LeaderElectionId,
    LeaderElectionNamespace,
    LeaderElectionResourceLock,
    LeaseDuration,
    RenewDeadline,
    GracefulShutdownTimeout,
    AnsibleLogEvents,
    ProxyPort,
    EnableHttp2,
    SecureMetrics,
    MetricsRequireRbac,
}

/// An alternative name for a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The flag name, without leading dashes
    pub name: &'static str,
    /// Deprecation notice shown when the alias is used
    pub deprecated: Option<&'static str>,
}

impl Alias {
    /// Creates a deprecated alias with the given notice.
    #[must_use]
    pub const fn deprecated(name: &'static str, notice: &'static str) -> Self {
        Self {
            name,
            deprecated: Some(notice),
        }
    }
}

/// One logical configuration item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Target field in the resolved options
    pub field: Field,
    /// Canonical flag name
    pub name: &'static str,
    /// Aliases in priority order
    pub aliases: Vec<Alias>,
    /// Declared value type
    pub kind: ValueKind,
    /// Compiled-in default
    pub default: FlagValue,
    /// Environment variable the resolved value is exported to
    pub env: Option<&'static str>,
    /// Deprecation notice for the canonical name itself
    pub deprecated: Option<&'static str>,
}

impl Setting {
    /// Creates a setting with no aliases.
    #[must_use]
    pub fn new(field: Field, name: &'static str, kind: ValueKind, default: FlagValue) -> Self {
        Self {
            field,
            name,
            aliases: Vec::new(),
            kind,
            default,
            env: None,
            deprecated: None,
        }
    }

    /// Creates a string setting.
    #[must_use]
    pub fn string(field: Field, name: &'static str, default: &str) -> Self {
        Self::new(field, name, ValueKind::Str, FlagValue::from(default))
    }

    /// Creates a boolean setting.
    #[must_use]
    pub fn bool(field: Field, name: &'static str, default: bool) -> Self {
        Self::new(field, name, ValueKind::Bool, FlagValue::Bool(default))
    }

    /// Creates an integer setting.
    #[must_use]
    pub fn int(field: Field, name: &'static str, default: i64) -> Self {
        Self::new(field, name, ValueKind::Int, FlagValue::Int(default))
    }

    /// Creates a duration setting.
    #[must_use]
    pub fn duration(field: Field, name: &'static str, default: Duration) -> Self {
        Self::new(field, name, ValueKind::Duration, FlagValue::Duration(default))
    }

    /// Appends an alias. Aliases are consulted in the order they are added.
    #[must_use]
    pub fn with_alias(mut self, alias: Alias) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Sets the environment variable the resolved value is exported to.
    #[must_use]
    pub const fn with_env(mut self, env: &'static str) -> Self {
        self.env = Some(env);
        self
    }

    /// Marks the canonical name itself as deprecated.
    #[must_use]
    pub const fn deprecated(mut self, notice: &'static str) -> Self {
        self.deprecated = Some(notice);
        self
    }

    /// Returns the canonical name followed by every alias, in priority order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().map(|a| a.name))
    }

    /// Returns the alias with the given name, if any.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.iter().find(|a| a.name == name)
    }
}

/// Registry of all recognized settings.
#[derive(Debug, Default)]
pub struct FlagCatalog {
    settings: Vec<Setting>,
    by_name: HashMap<&'static str, usize>,
    by_field: HashMap<Field, usize>,
}

impl FlagCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the catalog of every setting the operator recognizes.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in declarations collide, which is a bug.
    pub fn builtin() -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        catalog.register_all(builtin_settings())?;
        Ok(catalog)
    }

    /// Registers a setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateSetting`] if any of its names, or its
    /// target field, is already registered, and [`ConfigError::TypeMismatch`]
    /// if its default does not match its declared kind.
    pub fn register(&mut self, setting: Setting) -> Result<(), ConfigError> {
        if setting.default.kind() != setting.kind {
            return Err(ConfigError::TypeMismatch {
                flag: setting.name,
                expected: setting.kind,
                found: setting.default.kind(),
            });
        }

        let mut seen = Vec::new();
        for name in setting.names() {
            if self.by_name.contains_key(name) || seen.contains(&name) {
                return Err(ConfigError::DuplicateSetting {
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }
        if self.by_field.contains_key(&setting.field) {
            return Err(ConfigError::DuplicateSetting {
                name: setting.name.to_string(),
            });
        }

        let index = self.settings.len();
        for name in seen {
            self.by_name.insert(name, index);
        }
        self.by_field.insert(setting.field, index);
        self.settings.push(setting);
        Ok(())
    }

    /// Registers several settings, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`FlagCatalog::register`].
    pub fn register_all(
        &mut self,
        settings: impl IntoIterator<Item = Setting>,
    ) -> Result<(), ConfigError> {
        settings.into_iter().try_for_each(|s| self.register(s))
    }

    /// Looks up a setting by canonical name or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.by_name.get(name).map(|&i| &self.settings[i])
    }

    /// Looks up the setting targeting a field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnregisteredFlag`] if no setting targets `field`.
    pub fn setting(&self, field: Field) -> Result<&Setting, ConfigError> {
        self.by_field
            .get(&field)
            .map(|&i| &self.settings[i])
            .ok_or_else(|| ConfigError::unregistered(&format!("{field:?}")))
    }

    /// Returns true if `name` is a registered canonical name or alias.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterates over settings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    /// Number of registered settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

fn builtin_settings() -> Vec<Setting> {
    let mut settings = ansible_settings();
    settings.extend(manager_settings());
    settings
}

fn ansible_settings() -> Vec<Setting> {
    vec![
        Setting::string(Field::WatchesFile, "watches-file", defaults::WATCHES_FILE),
        Setting::bool(
            Field::InjectOwnerRef,
            "inject-owner-ref",
            defaults::INJECT_OWNER_REF,
        ),
        Setting::int(
            Field::AnsibleVerbosity,
            "ansible-verbosity",
            defaults::ANSIBLE_VERBOSITY,
        ),
        Setting::string(Field::AnsibleRolesPath, "ansible-roles-path", "")
            .with_env(defaults::ANSIBLE_ROLES_PATH_ENV),
        Setting::string(Field::AnsibleCollectionsPath, "ansible-collections-path", "")
            .with_env(defaults::ANSIBLE_COLLECTIONS_PATH_ENV),
        Setting::string(Field::AnsibleArgs, "ansible-args", ""),
        Setting::duration(
            Field::ReconcilePeriod,
            "reconcile-period",
            defaults::reconcile_period(),
        ),
        Setting::int(
            Field::MaxConcurrentReconciles,
            "max-concurrent-reconciles",
            defaults::max_concurrent_reconciles(),
        ),
        Setting::string(
            Field::AnsibleLogEvents,
            "ansible-log-events",
            defaults::ANSIBLE_LOG_EVENTS,
        ),
        Setting::int(Field::ProxyPort, "proxy-port", defaults::PROXY_PORT),
    ]
}

fn manager_settings() -> Vec<Setting> {
    vec![
        Setting::string(
            Field::MetricsBindAddress,
            "metrics-bind-address",
            defaults::METRICS_BIND_ADDRESS,
        )
        .with_alias(Alias::deprecated(
            "metrics-addr",
            "use --metrics-bind-address instead",
        )),
        Setting::string(
            Field::HealthProbeBindAddress,
            "health-probe-bind-address",
            defaults::HEALTH_PROBE_BIND_ADDRESS,
        ),
        Setting::bool(Field::LeaderElection, "leader-elect", false).with_alias(
            Alias::deprecated("enable-leader-election", "use --leader-elect instead"),
        ),
        Setting::string(Field::LeaderElectionId, "leader-election-id", ""),
        Setting::string(
            Field::LeaderElectionNamespace,
            "leader-election-namespace",
            "",
        ),
        Setting::string(
            Field::LeaderElectionResourceLock,
            "leader-elect-resource-lock",
            defaults::LEADER_ELECT_RESOURCE_LOCK,
        )
        .deprecated("this flag is now hardcoded to 'leases', the only supported option"),
        Setting::duration(
            Field::LeaseDuration,
            "leader-elect-lease-duration",
            defaults::lease_duration(),
        ),
        Setting::duration(
            Field::RenewDeadline,
            "leader-elect-renew-deadline",
            defaults::renew_deadline(),
        ),
        Setting::duration(
            Field::GracefulShutdownTimeout,
            "graceful-shutdown-timeout",
            defaults::graceful_shutdown_timeout(),
        ),
        Setting::bool(Field::EnableHttp2, "enable-http2", false),
        Setting::bool(Field::SecureMetrics, "metrics-secure", false),
        Setting::bool(Field::MetricsRequireRbac, "metrics-require-rbac", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    mod builtin {
        use super::*;

        #[test]
        fn registers_every_setting() {
            let catalog = FlagCatalog::builtin().unwrap();
            assert_eq!(catalog.len(), 22);
        }

        #[test]
        fn deprecated_aliases_resolve_to_canonical_setting() {
            let catalog = FlagCatalog::builtin().unwrap();

            let metrics = catalog.get("metrics-addr").unwrap();
            assert_eq!(metrics.name, "metrics-bind-address");
            assert!(metrics.alias("metrics-addr").unwrap().deprecated.is_some());

            let leader = catalog.get("enable-leader-election").unwrap();
            assert_eq!(leader.name, "leader-elect");
        }

        #[test]
        fn defaults_match_declared_values() {
            let catalog = FlagCatalog::builtin().unwrap();
            let default = |name: &str| catalog.get(name).unwrap().default.clone();

            assert_eq!(default("watches-file"), FlagValue::from("./watches.yaml"));
            assert_eq!(default("inject-owner-ref"), FlagValue::Bool(true));
            assert_eq!(default("ansible-verbosity"), FlagValue::Int(2));
            assert_eq!(
                default("reconcile-period"),
                FlagValue::Duration(Duration::from_secs(36_000))
            );
            assert_eq!(default("metrics-bind-address"), FlagValue::from(":8443"));
            assert_eq!(default("health-probe-bind-address"), FlagValue::from(":6789"));
            assert_eq!(
                default("leader-elect-lease-duration"),
                FlagValue::Duration(Duration::from_secs(15))
            );
            assert_eq!(default("proxy-port"), FlagValue::Int(8888));
            assert_eq!(default("ansible-log-events"), FlagValue::from("tasks"));
        }

        #[test]
        fn max_concurrent_reconciles_defaults_to_parallelism() {
            let catalog = FlagCatalog::builtin().unwrap();
            let FlagValue::Int(n) = catalog.get("max-concurrent-reconciles").unwrap().default
            else {
                panic!("expected int default");
            };
            assert!(n >= 1);
        }

        #[test]
        fn path_settings_carry_env_names() {
            let catalog = FlagCatalog::builtin().unwrap();
            assert_eq!(
                catalog.get("ansible-roles-path").unwrap().env,
                Some("ANSIBLE_ROLES_PATH")
            );
            assert_eq!(
                catalog.get("ansible-collections-path").unwrap().env,
                Some("ANSIBLE_COLLECTIONS_PATH")
            );
        }

        #[test]
        fn every_field_is_addressable() {
            let catalog = FlagCatalog::builtin().unwrap();
            for setting in catalog.iter() {
                assert_eq!(catalog.setting(setting.field).unwrap().name, setting.name);
            }
        }
    }

    mod registration {
        use super::*;

        #[test]
        fn duplicate_canonical_name_is_rejected() {
            let mut catalog = FlagCatalog::new();
            catalog
                .register(Setting::bool(Field::EnableHttp2, "enable-http2", false))
                .unwrap();

            let result =
                catalog.register(Setting::bool(Field::SecureMetrics, "enable-http2", true));

            assert!(matches!(
                result,
                Err(ConfigError::DuplicateSetting { ref name }) if name == "enable-http2"
            ));
        }

        #[test]
        fn alias_colliding_with_canonical_is_rejected() {
            let mut catalog = FlagCatalog::new();
            catalog
                .register(Setting::string(Field::MetricsBindAddress, "metrics-addr", ""))
                .unwrap();

            let result = catalog.register(
                Setting::string(Field::HealthProbeBindAddress, "probe", "")
                    .with_alias(Alias::deprecated("metrics-addr", "old")),
            );

            assert!(matches!(result, Err(ConfigError::DuplicateSetting { .. })));
        }

        #[test]
        fn second_setting_for_same_field_is_rejected() {
            let mut catalog = FlagCatalog::new();
            catalog
                .register(Setting::bool(Field::LeaderElection, "leader-elect", false))
                .unwrap();

            let result = catalog.register(Setting::bool(Field::LeaderElection, "elect", false));

            assert!(matches!(result, Err(ConfigError::DuplicateSetting { .. })));
        }

        #[test]
        fn failed_registration_leaves_catalog_unchanged() {
            let mut catalog = FlagCatalog::new();
            catalog
                .register(Setting::bool(Field::LeaderElection, "leader-elect", false))
                .unwrap();

            let _ = catalog.register(
                Setting::bool(Field::EnableHttp2, "enable-http2", false)
                    .with_alias(Alias::deprecated("leader-elect", "clash")),
            );

            assert_eq!(catalog.len(), 1);
            assert!(!catalog.contains("enable-http2"));
        }

        #[test]
        fn mismatched_default_is_rejected() {
            let mut catalog = FlagCatalog::new();
            let result = catalog.register(Setting::new(
                Field::ProxyPort,
                "proxy-port",
                ValueKind::Int,
                FlagValue::from("8888"),
            ));

            assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
        }

        #[test]
        fn names_lists_canonical_first() {
            let setting = Setting::bool(Field::LeaderElection, "leader-elect", false)
                .with_alias(Alias::deprecated("enable-leader-election", "old"))
                .with_alias(Alias::deprecated("elect", "older"));

            let names: Vec<_> = setting.names().collect();

            assert_eq!(names, ["leader-elect", "enable-leader-election", "elect"]);
        }
    }
}
