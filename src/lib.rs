//! Operator flags: runtime option resolution for an ansible-based operator.
//!
//! Merges built-in defaults, caller-supplied options and command-line
//! flags into one set of options for the manager, the metrics server and
//! the webhook server.

pub mod config;
pub mod security;
pub mod server;
