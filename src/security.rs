//! Security policy derived from the resolved boolean toggles.
//!
//! Runs after the merge. HTTP/2 stays off on both servers unless the
//! operator opts in, because several HTTP/2 implementations are exposed to
//! stream-reset denial of service.

use crate::config::ResolvedOptions;
use crate::server::{FilterProvider, TlsOption};

/// The toggles the policy is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SecurityPolicy {
    /// Allow HTTP/2 on the webhook and metrics servers
    pub enable_http2: bool,
    /// Serve metrics over TLS
    pub secure_metrics: bool,
    /// Gate metrics access on cluster authn/authz
    pub metrics_require_rbac: bool,
}

impl SecurityPolicy {
    /// Reads the toggles from merged options.
    #[must_use]
    pub const fn from_options(options: &ResolvedOptions) -> Self {
        Self {
            enable_http2: options.enable_http2,
            secure_metrics: options.secure_metrics,
            metrics_require_rbac: options.metrics_require_rbac,
        }
    }

    /// Installs the policy on `options`.
    ///
    /// - Without HTTP/2, both servers get the HTTP/1.1-only TLS hook.
    ///   Hooks the caller already installed are kept and the restriction is
    ///   added at most once.
    /// - `secure_metrics` is passed through to the metrics server.
    /// - With RBAC, the metrics server gets the authn/authz filter.
    #[must_use]
    pub fn apply(&self, mut options: ResolvedOptions) -> ResolvedOptions {
        if !self.enable_http2 {
            tracing::debug!("HTTP/2 disabled on webhook and metrics servers");
            install(&mut options.webhook_server.tls_opts, TlsOption::DisableHttp2);
            install(&mut options.metrics.tls_opts, TlsOption::DisableHttp2);
        }

        options.metrics.secure_serving = self.secure_metrics;

        if self.metrics_require_rbac {
            tracing::debug!("Metrics endpoint protected with authentication and authorization");
            options.metrics.filter_provider = Some(FilterProvider::AuthenticationAndAuthorization);
        }

        options
    }
}

fn install(opts: &mut Vec<TlsOption>, opt: TlsOption) {
    if !opts.contains(&opt) {
        opts.push(opt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlagCatalog, OptionsMerger, ParsedFlags, PartialOptions};

    fn merged(flags: &ParsedFlags, caller: PartialOptions) -> ResolvedOptions {
        let catalog = FlagCatalog::builtin().unwrap();
        OptionsMerger::from_flags(&catalog, flags)
            .merge(caller)
            .unwrap()
    }

    fn secured(flags: &ParsedFlags) -> ResolvedOptions {
        let options = merged(flags, PartialOptions::default());
        SecurityPolicy::from_options(&options).apply(options)
    }

    mod http2 {
        use super::*;

        #[test]
        fn disabled_by_default_on_both_servers() {
            let options = secured(&ParsedFlags::new());

            assert_eq!(options.webhook_server.tls_config().next_protos, ["http/1.1"]);
            assert_eq!(options.metrics.tls_config().next_protos, ["http/1.1"]);
        }

        #[test]
        fn enabling_removes_restriction() {
            let options = secured(&ParsedFlags::new().with("enable-http2", true));

            assert!(options.webhook_server.tls_opts.is_empty());
            assert!(options.metrics.tls_opts.is_empty());
            assert_eq!(options.metrics.tls_config().next_protos, ["h2", "http/1.1"]);
        }

        #[test]
        fn caller_tls_hooks_are_preserved_without_duplicates() {
            let options = merged(
                &ParsedFlags::new(),
                PartialOptions {
                    metrics_tls_opts: vec![TlsOption::DisableHttp2],
                    ..PartialOptions::default()
                },
            );
            let policy = SecurityPolicy::from_options(&options);

            let once = policy.apply(options);
            let twice = policy.apply(once.clone());

            assert_eq!(once.metrics.tls_opts, [TlsOption::DisableHttp2]);
            assert_eq!(once, twice);
        }
    }

    mod metrics {
        use super::*;

        #[test]
        fn secure_serving_passes_through() {
            let off = secured(&ParsedFlags::new());
            assert!(!off.metrics.secure_serving);

            let on = secured(&ParsedFlags::new().with("metrics-secure", true));
            assert!(on.metrics.secure_serving);
        }

        #[test]
        fn rbac_installs_filter() {
            let options = secured(&ParsedFlags::new().with("metrics-require-rbac", true));
            assert_eq!(
                options.metrics.filter_provider,
                Some(FilterProvider::AuthenticationAndAuthorization)
            );
        }

        #[test]
        fn no_filter_without_rbac() {
            let options = secured(&ParsedFlags::new());
            assert!(options.metrics.filter_provider.is_none());
        }

        #[test]
        fn caller_toggles_feed_policy() {
            let options = merged(
                &ParsedFlags::new(),
                PartialOptions {
                    secure_metrics: Some(true),
                    metrics_require_rbac: Some(true),
                    enable_http2: Some(true),
                    ..PartialOptions::default()
                },
            );
            let options = SecurityPolicy::from_options(&options).apply(options);

            assert!(options.metrics.secure_serving);
            assert!(options.metrics.filter_provider.is_some());
            assert!(options.metrics.tls_opts.is_empty());
        }
    }
}
