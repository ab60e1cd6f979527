use anyhow::Result;
use archmap::cli::{Cli, Commands};
use archmap::commands::{self, AnalyzeConfig, ReportConfig};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.verbosity());

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            config,
            depth,
            no_progress,
            verbosity: _,
        } => commands::handle_analyze(AnalyzeConfig {
            path,
            format,
            output,
            config,
            depth,
            show_progress: !no_progress,
        }),
        Commands::Report {
            snapshot,
            format,
            output,
            config,
            verbosity: _,
        } => commands::handle_report(ReportConfig {
            snapshot,
            format,
            output,
            config,
        }),
        Commands::Init { force } => commands::init_config(force),
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("archmap={}", default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
