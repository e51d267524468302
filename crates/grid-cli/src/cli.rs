//! CLI argument definitions for the record grid.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use grid_model::StatusFilter;

#[derive(Parser)]
#[command(
    name = "record-grid",
    version,
    about = "Browse and manage records in a paginated terminal grid",
    long_about = "Browse records with search, status filter, sorting and pagination.\n\n\
                  View state round-trips through a URL-style query string and column\n\
                  visibility persists across sessions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Grid configuration file (TOML).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Records to browse (JSON array). Built-in sample data when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    pub data: Option<PathBuf>,

    /// Column metadata (JSON array). Built-in columns when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    pub metadata: Option<PathBuf>,

    /// Directory holding persisted column visibility.
    #[arg(long = "settings-dir", value_name = "DIR", global = true)]
    pub settings_dir: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render one page of records.
    List(ViewArgs),

    /// Flip a record between active and inactive.
    Toggle(ToggleArgs),

    /// Show or change which columns are visible.
    Columns(ColumnsArgs),
}

/// View parameters. Explicit flags override the query string.
#[derive(Args, Default)]
pub struct ViewArgs {
    /// Prior view as a query string, e.g. "page=2&status=active&sort=name&order=desc".
    #[arg(long, value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Search text.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Status filter.
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Page number (1-based).
    #[arg(long, short = 'p')]
    pub page: Option<usize>,

    /// Records per page.
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Sort by this column key.
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending.
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Args)]
pub struct ToggleArgs {
    /// Record identifier.
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args)]
pub struct ColumnsArgs {
    #[command(subcommand)]
    pub action: Option<ColumnsAction>,
}

#[derive(Subcommand, Clone)]
pub enum ColumnsAction {
    /// Hide a column.
    Hide { key: String },
    /// Show a column.
    Show { key: String },
    /// Make every column visible again.
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    All,
    Active,
    Inactive,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Active => Self::Active,
            StatusArg::Inactive => Self::Inactive,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_overrides() {
        let cli = Cli::try_parse_from([
            "record-grid",
            "list",
            "--query",
            "page=2",
            "--status",
            "inactive",
            "--sort",
            "name",
            "--desc",
        ])
        .unwrap();

        let Command::List(view) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(view.query, "page=2");
        assert!(matches!(view.status, Some(StatusArg::Inactive)));
        assert_eq!(view.sort.as_deref(), Some("name"));
        assert!(view.desc);
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["record-grid", "list", "--desc"]).is_err());
    }

    #[test]
    fn test_parse_columns_action() {
        let cli = Cli::try_parse_from(["record-grid", "columns", "hide", "email"]).unwrap();
        let Command::Columns(args) = cli.command else {
            panic!("expected columns");
        };
        assert!(matches!(args.action, Some(ColumnsAction::Hide { key }) if key == "email"));
    }
}
