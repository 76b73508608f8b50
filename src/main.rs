//! Operator flags
//!
//! Entry point: resolves the operator's runtime options and prints them.

use operator_flags::config::{
    Cli, ConfigError, FlagCatalog, PartialOptions, ResolvedOptions, resolve,
};
use std::process::ExitCode;

mod app;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.verbose);

    let (catalog, options) = match resolve_options(&cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    tracing::info!("{options}");
    for (name, value) in options.ansible_environment(&catalog) {
        tracing::info!("Exporting {name}={value} to ansible");
    }

    print_options(&options)
}

/// Loads caller options and merges them with the command line.
fn resolve_options(cli: &Cli) -> Result<(FlagCatalog, ResolvedOptions), ConfigError> {
    let catalog = FlagCatalog::builtin()?;

    let caller = match cli.options_file {
        Some(ref path) => {
            tracing::debug!("Loading caller options from {}", path.display());
            PartialOptions::load(path)?
        }
        None => PartialOptions::default(),
    };

    let flags = cli.parsed_flags();
    tracing::debug!("{} flag(s) set on the command line", flags.explicit().len());
    let options = resolve(&catalog, Some(&flags), caller)?;
    Ok((catalog, options))
}

/// Writes the resolved options to stdout as JSON.
fn print_options(options: &ResolvedOptions) -> ExitCode {
    match serde_json::to_string_pretty(options) {
        Ok(json) => {
            println!("{json}");
            exit_code::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to serialize resolved options: {e}");
            exit_code::output_error()
        }
    }
}
