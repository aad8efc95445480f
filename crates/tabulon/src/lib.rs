//! # Tabulon - command-line front end
//!
//! Wires the [`tabulon_table`] engine and the [`tabulon_access`] policy to a
//! small CLI:
//!
//! - `tabulon view` reads a JSON array of records and prints one page after
//!   search, filters, sort and selection
//! - `tabulon fields` lists the filter catalog for a set of columns
//! - `tabulon access` signs a user in and reports module access, the
//!   visible navigation and route guard decisions
//!
//! Commands are plain functions from parsed arguments and an
//! [`Environment`] to the text to print, so they run in-process in tests.
//!
//! ## Output
//!
//! `--output` selects [`OutputMode`]: an aligned text table, or the
//! command's data as JSON, YAML or CSV. `auto` picks text on a terminal and
//! JSON otherwise.
//!
//! ## Settings
//!
//! See [`config`] for the settings file and `TABULON_*` variables.

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod load;
pub mod output;
pub mod render;
pub mod serialize;

pub use cli::{Cli, Command};
pub use config::{ConfigError, Settings};
pub use env::{EnvReader, Environment, MockEnv, MockStdin, RealEnv, RealStdin, StdinReader};
pub use output::OutputMode;
pub use serialize::SerializeError;

/// Runs a parsed command line and returns the text to print.
pub fn run(cli: &Cli, env: &Environment) -> anyhow::Result<String> {
    let settings = Settings::load(cli.config.as_deref(), env.env)?;
    if let Some(source) = &settings.source {
        log::info!("using settings from {}", source.display());
    }
    let mode = cli
        .output
        .or(settings.output)
        .unwrap_or_default()
        .resolve_auto(env.stdout_is_terminal);
    log::debug!("output mode {mode}");

    match &cli.command {
        Command::View(args) => commands::view::run(args, &settings, mode, env),
        Command::Fields(args) => commands::fields::run(args, &settings, mode, env),
        Command::Access(args) => commands::access::run(args, &settings, mode, env),
    }
}
