//! Interface types for the metrics and webhook servers.
//!
//! The servers themselves live outside this crate. These types describe
//! what they are handed: bind addresses, TLS option hooks and the
//! authorization filter to install.

use serde::{Deserialize, Serialize};

/// ALPN protocol identifier for HTTP/2.
pub const ALPN_H2: &str = "h2";

/// ALPN protocol identifier for HTTP/1.1.
pub const ALPN_HTTP1: &str = "http/1.1";

/// The TLS settings a server negotiates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// ALPN protocols offered, in preference order
    pub next_protos: Vec<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            next_protos: vec![ALPN_H2.to_string(), ALPN_HTTP1.to_string()],
        }
    }
}

/// A hook that mutates a server's TLS configuration before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TlsOption {
    /// Restrict protocol negotiation to HTTP/1.1
    DisableHttp2,
}

impl TlsOption {
    /// Applies the hook to `config`.
    pub fn apply(self, config: &mut TlsConfig) {
        match self {
            Self::DisableHttp2 => config.next_protos = vec![ALPN_HTTP1.to_string()],
        }
    }
}

/// Builds the effective TLS configuration from a list of hooks.
#[must_use]
pub fn tls_config(opts: &[TlsOption]) -> TlsConfig {
    let mut config = TlsConfig::default();
    for opt in opts {
        opt.apply(&mut config);
    }
    config
}

/// Request filter installed in front of the metrics handler.
///
/// Authentication and authorization decisions are delegated to the
/// cluster's access-control API; this crate only selects the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterProvider {
    /// Authenticate and authorize every scrape via the cluster
    AuthenticationAndAuthorization,
}

/// Options handed to the metrics server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsServerOptions {
    /// Address the metrics endpoint binds to
    pub bind_address: String,
    /// Serve metrics over TLS
    pub secure_serving: bool,
    /// TLS hooks applied before serving
    pub tls_opts: Vec<TlsOption>,
    /// Filter protecting the endpoint, if any
    pub filter_provider: Option<FilterProvider>,
}

impl MetricsServerOptions {
    /// Returns the TLS configuration the server will negotiate with.
    #[must_use]
    pub fn tls_config(&self) -> TlsConfig {
        tls_config(&self.tls_opts)
    }
}

/// Options handed to the webhook server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebhookServerOptions {
    /// TLS hooks applied before serving
    pub tls_opts: Vec<TlsOption>,
}

impl WebhookServerOptions {
    /// Returns the TLS configuration the server will negotiate with.
    #[must_use]
    pub fn tls_config(&self) -> TlsConfig {
        tls_config(&self.tls_opts)
    }
}
