use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::{emit, resolve_config};
use crate::cli::OutputFormat;
use crate::core::AnalysisInput;
use crate::engine::Engine;
use crate::io;

pub struct ReportConfig {
    pub snapshot: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Parse a JSON [`AnalysisInput`] snapshot.
pub fn parse_snapshot(contents: &str) -> Result<AnalysisInput> {
    serde_json::from_str(contents).context("snapshot is not a valid analysis input")
}

pub fn handle_report(options: ReportConfig) -> Result<()> {
    let contents = io::read_file(&options.snapshot)
        .with_context(|| format!("reading {}", options.snapshot.display()))?;
    let input = parse_snapshot(&contents)?;

    let start = options
        .snapshot
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = resolve_config(options.config.as_deref(), &start)?;

    let result = Engine::new(config).analyze(&input).context("analysis failed")?;
    info!(modules = result.modules.len(), "Report generated");
    emit(&result, options.format, options.output.as_deref())
}
