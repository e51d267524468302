//! Record grid CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use grid_cli::app::{App, AppOptions, ColumnChange, ViewOverrides};
use grid_cli::logging::{LogConfig, LogFormat, init_logging};
use grid_model::SortSpec;

mod cli;

use crate::cli::{Cli, ColumnsAction, Command, LogFormatArg, LogLevelArg, ViewArgs};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<String> {
    let options = AppOptions {
        config: cli.config,
        data: cli.data,
        metadata: cli.metadata,
        settings_dir: cli.settings_dir,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let app = App::load(&options)?;

    runtime.block_on(async {
        match cli.command {
            Command::List(args) => app.list(&overrides(args)).await,
            Command::Toggle(args) => app.toggle(&args.id, &overrides(args.view)).await,
            Command::Columns(args) => {
                let change = args.action.map(|action| match action {
                    ColumnsAction::Hide { key } => ColumnChange::Hide(key),
                    ColumnsAction::Show { key } => ColumnChange::Show(key),
                    ColumnsAction::Reset => ColumnChange::Reset,
                });
                app.columns(change.as_ref())
            }
        }
    })
}

fn overrides(args: ViewArgs) -> ViewOverrides {
    ViewOverrides {
        query: args.query,
        search: args.search,
        status: args.status.map(Into::into),
        page: args.page,
        page_size: args.page_size,
        sort: args.sort.map(|key| SortSpec {
            field_key: key,
            descending: args.desc,
        }),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
