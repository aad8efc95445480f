//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::output::OutputMode;

/// Filter, sort, page and select tabular records; check module access.
#[derive(Debug, Parser)]
#[command(name = "tabulon", version, about)]
#[command(long_about = "Tabulon views a JSON array of records as a table.\n\n\
    Search, filters, sorting, paging and row selection are applied in that\n\
    order. The access command signs a user in against a credential\n\
    directory and reports which modules and pages they may open.")]
pub struct Cli {
    /// Settings file (default: ./tabulon.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputMode>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of records
    View(ViewArgs),

    /// List filterable fields and their operators
    Fields(FieldsArgs),

    /// Sign in and report module access
    Access(AccessArgs),
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// JSON array of records, or - for stdin
    #[arg(short, long, default_value = "-", value_name = "FILE")]
    pub records: String,

    /// Column descriptors (YAML, or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    pub columns: Option<PathBuf>,

    /// Case-insensitive text matched against filterable columns
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter as FIELD:OPERATOR:VALUE (repeatable, all must match)
    #[arg(short, long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Sort by FIELD; naming the same field again flips the direction
    #[arg(long = "sort", value_name = "FIELD")]
    pub sorts: Vec<String>,

    /// Page to show, starting at 1
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,

    /// Rows per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Show every row on one page
    #[arg(long)]
    pub all: bool,

    /// Field identifying a record for selection
    #[arg(short, long, value_name = "FIELD")]
    pub key: Option<String>,

    /// Toggle selection of the row with this key (repeatable)
    #[arg(long = "select", value_name = "KEY")]
    pub selects: Vec<String>,

    /// Select every row on the shown page
    #[arg(long)]
    pub select_page: bool,
}

#[derive(Debug, Args)]
pub struct FieldsArgs {
    /// Column descriptors (YAML, or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    pub columns: Option<PathBuf>,

    /// Infer columns from the first record of this file instead
    #[arg(short, long, value_name = "FILE", conflicts_with = "columns")]
    pub records: Option<String>,
}

#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Credential directory (YAML, or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    pub users: Option<PathBuf>,

    /// Module access policy (default: built-in table)
    #[arg(long, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Email to sign in with
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password (default: TABULON_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Include the visible navigation tree
    #[arg(long)]
    pub nav: bool,

    /// Page path to check, e.g. /invoice/create
    #[arg(long)]
    pub path: Option<String>,

    /// Module the checked page belongs to
    #[arg(short, long)]
    pub module: Option<String>,

    /// Permission the checked page requires (repeatable, any one suffices)
    #[arg(long = "permission", value_name = "PERMISSION")]
    pub permissions: Vec<String>,

    /// Require every --permission instead of any one
    #[arg(long)]
    pub require_all: bool,
}
