//! Configuration layer for the operator.
//!
//! This module provides:
//! - The flag catalog ([`FlagCatalog`], [`Setting`], [`Alias`])
//! - CLI argument parsing ([`Cli`], [`OperatorFlags`])
//! - Explicit-set tracking ([`ChangeTracker`], [`ParsedFlags`])
//! - Caller-supplied options ([`PartialOptions`])
//! - The precedence merge ([`OptionsMerger`]) producing [`ResolvedOptions`]
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Each setting is resolved with the following priority (highest to lowest):
//!
//! 1. **Canonical flag** - explicitly passed on the command line
//! 2. **Deprecated alias** - explicitly passed under an older name
//! 3. **Caller options** - any `Some` field of [`PartialOptions`]
//! 4. **Built-in defaults** - the catalog default
//!
//! A flag only counts when the user typed it. A caller value therefore wins
//! over a flag's own default, but never over an explicit flag.
//!
//! # Aliases
//!
//! `--metrics-addr` and `--enable-leader-election` are deprecated aliases of
//! `--metrics-bind-address` and `--leader-elect`. When the canonical name and
//! an alias are both given, the canonical name wins and a warning is logged.
//!
//! # Resource Lock
//!
//! `--leader-elect-resource-lock` is accepted but ignored. The lock is the
//! caller's value if non-empty, otherwise `leases`.
//!
//! # Security Policy
//!
//! After merging, [`resolve`] applies [`SecurityPolicy`](crate::security::SecurityPolicy),
//! which restricts both servers to HTTP/1.1 unless `--enable-http2` is set and
//! wires up secure serving and RBAC for the metrics endpoint.

mod catalog;
mod cli;
pub mod defaults;
mod error;
mod merge;
mod partial;
mod resolved;
mod tracker;
mod value;


pub use catalog::{Alias, Field, FlagCatalog, Setting};
pub use cli::{Cli, OperatorFlags};
pub use error::ConfigError;
pub use merge::{FromFlagValue, OptionsMerger, Resolved, ValueSource};
pub use partial::PartialOptions;
pub use resolved::ResolvedOptions;
pub use tracker::{ChangeTracker, ExplicitSet, ParsedFlags};
pub use value::{FlagValue, LogEvents, ValueKind, format_duration, parse_duration};

use crate::security::SecurityPolicy;

/// Resolves the final options.
///
/// `flags` is the command-line parse result, or `None` when options are
/// resolved programmatically; flags are then inert and only `caller` and the
/// defaults participate.
///
/// # Errors
///
/// Returns an error if the catalog is inconsistent with the options fields or
/// a value does not fit its field.
pub fn resolve(
    catalog: &FlagCatalog,
    flags: Option<&ParsedFlags>,
    caller: PartialOptions,
) -> Result<ResolvedOptions, ConfigError> {
    let merger = flags.map_or_else(
        || OptionsMerger::detached(catalog),
        |flags| OptionsMerger::from_flags(catalog, flags),
    );
    let merged = merger.merge(caller)?;
    Ok(SecurityPolicy::from_options(&merged).apply(merged))
}
