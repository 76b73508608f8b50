//! Tracking which flags the user supplied explicitly.

use std::collections::{BTreeSet, HashMap};

use super::catalog::{FlagCatalog, Setting};
use super::error::ConfigError;
use super::value::FlagValue;

/// The set of flag names (canonical or alias) supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitSet(BTreeSet<String>);

impl ExplicitSet {
    /// Returns true if `name` was supplied.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Iterates over the supplied names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of supplied names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExplicitSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Output of the command-line parser: the typed value of every flag the
/// user supplied, keyed by the name it was supplied under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFlags {
    values: HashMap<String, FlagValue>,
    explicit: ExplicitSet,
}

impl ParsedFlags {
    /// Creates an empty parse result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a flag the user supplied.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FlagValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Records a flag the user supplied.
    pub fn set(&mut self, name: &str, value: impl Into<FlagValue>) {
        self.values.insert(name.to_string(), value.into());
        self.explicit.0.insert(name.to_string());
    }

    /// Records a flag if the parser produced a value for it.
    pub fn set_opt<T: Into<FlagValue>>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    /// Returns the value supplied under `name`, if any.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    /// Returns the set of explicitly supplied names.
    #[must_use]
    pub const fn explicit(&self) -> &ExplicitSet {
        &self.explicit
    }
}

/// Answers whether a flag was explicitly set for this invocation.
///
/// Built once from an immutable [`ExplicitSet`] snapshot. A detached tracker
/// has no command-line context and reports every flag as unset, which is
/// how options are resolved programmatically.
#[derive(Debug, Clone, Copy)]
pub struct ChangeTracker<'a> {
    catalog: &'a FlagCatalog,
    explicit: Option<&'a ExplicitSet>,
}

impl<'a> ChangeTracker<'a> {
    /// Creates a tracker backed by the names the user supplied.
    #[must_use]
    pub const fn new(catalog: &'a FlagCatalog, explicit: &'a ExplicitSet) -> Self {
        Self {
            catalog,
            explicit: Some(explicit),
        }
    }

    /// Creates a tracker with no command-line context.
    #[must_use]
    pub const fn detached(catalog: &'a FlagCatalog) -> Self {
        Self {
            catalog,
            explicit: None,
        }
    }

    /// Returns true if the tracker has a live command-line context.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.explicit.is_some()
    }

    /// Reports whether `name` (canonical or alias) was explicitly set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnregisteredFlag`] if the catalog does not
    /// know `name`, regardless of whether the tracker is live.
    pub fn was_explicitly_set(&self, name: &str) -> Result<bool, ConfigError> {
        if !self.catalog.contains(name) {
            return Err(ConfigError::unregistered(name));
        }
        Ok(self.explicit.is_some_and(|set| set.contains(name)))
    }

    /// Returns the highest-priority explicitly set name of a setting:
    /// the canonical name first, then each alias in declared order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnregisteredFlag`] if `setting` is not part of
    /// the tracker's catalog.
    pub fn first_explicit(&self, setting: &Setting) -> Result<Option<&'static str>, ConfigError> {
        for name in setting.names() {
            if self.was_explicitly_set(name)? {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// Returns every explicitly set name of a setting, in priority order.
    ///
    /// # Errors
    ///
    /// See [`ChangeTracker::first_explicit`].
    pub fn all_explicit(&self, setting: &Setting) -> Result<Vec<&'static str>, ConfigError> {
        let mut names = Vec::new();
        for name in setting.names() {
            if self.was_explicitly_set(name)? {
                names.push(name);
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> FlagCatalog {
        FlagCatalog::builtin().unwrap()
    }

    mod live {
        use super::*;

        #[test]
        fn reports_supplied_canonical_name() {
            let catalog = catalog();
            let explicit: ExplicitSet = ["leader-elect"].into_iter().collect();
            let tracker = ChangeTracker::new(&catalog, &explicit);

            assert!(tracker.was_explicitly_set("leader-elect").unwrap());
            assert!(!tracker.was_explicitly_set("enable-leader-election").unwrap());
            assert!(!tracker.was_explicitly_set("metrics-secure").unwrap());
        }

        #[test]
        fn reports_supplied_alias() {
            let catalog = catalog();
            let explicit: ExplicitSet = ["metrics-addr"].into_iter().collect();
            let tracker = ChangeTracker::new(&catalog, &explicit);

            assert!(tracker.was_explicitly_set("metrics-addr").unwrap());
            assert!(!tracker.was_explicitly_set("metrics-bind-address").unwrap());
        }

        #[test]
        fn first_explicit_prefers_canonical_name() {
            let catalog = catalog();
            let explicit: ExplicitSet = ["enable-leader-election", "leader-elect"]
                .into_iter()
                .collect();
            let tracker = ChangeTracker::new(&catalog, &explicit);
            let setting = catalog.get("leader-elect").unwrap();

            assert_eq!(tracker.first_explicit(setting).unwrap(), Some("leader-elect"));
            assert_eq!(
                tracker.all_explicit(setting).unwrap(),
                ["leader-elect", "enable-leader-election"]
            );
        }

        #[test]
        fn first_explicit_falls_back_to_alias() {
            let catalog = catalog();
            let explicit: ExplicitSet = ["enable-leader-election"].into_iter().collect();
            let tracker = ChangeTracker::new(&catalog, &explicit);
            let setting = catalog.get("leader-elect").unwrap();

            assert_eq!(
                tracker.first_explicit(setting).unwrap(),
                Some("enable-leader-election")
            );
        }

        #[test]
        fn first_explicit_is_none_when_untouched() {
            let catalog = catalog();
            let explicit = ExplicitSet::default();
            let tracker = ChangeTracker::new(&catalog, &explicit);

            let setting = catalog.get("proxy-port").unwrap();
            assert_eq!(tracker.first_explicit(setting).unwrap(), None);
            assert!(tracker.is_live());
        }
    }

    mod detached {
        use super::*;

        #[test]
        fn reports_every_registered_name_as_unset() {
            let catalog = catalog();
            let tracker = ChangeTracker::detached(&catalog);

            assert!(!tracker.is_live());
            for setting in catalog.iter() {
                for name in setting.names() {
                    assert!(!tracker.was_explicitly_set(name).unwrap(), "{name}");
                }
            }
        }
    }

    #[test]
    fn unregistered_name_fails_fast() {
        let catalog = catalog();
        let explicit: ExplicitSet = ["bogus"].into_iter().collect();

        let live = ChangeTracker::new(&catalog, &explicit);
        assert!(matches!(
            live.was_explicitly_set("bogus"),
            Err(ConfigError::UnregisteredFlag { ref name }) if name == "bogus"
        ));

        let detached = ChangeTracker::detached(&catalog);
        assert!(detached.was_explicitly_set("bogus").is_err());
    }

    #[test]
    fn parsed_flags_marks_values_explicit() {
        let mut parsed = ParsedFlags::new().with("leader-elect", true);
        parsed.set_opt::<bool>("metrics-secure", None);
        parsed.set_opt("proxy-port", Some(9000_i64));

        assert_eq!(parsed.value("leader-elect"), Some(&FlagValue::Bool(true)));
        assert_eq!(parsed.value("proxy-port"), Some(&FlagValue::Int(9000)));
        assert!(parsed.value("metrics-secure").is_none());
        assert_eq!(parsed.explicit().len(), 2);
        assert!(parsed.explicit().contains("proxy-port"));
    }
}
