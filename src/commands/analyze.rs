use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::{emit, resolve_config};
use crate::cli::OutputFormat;
use crate::engine::Engine;
use crate::languages::LanguageRegistry;
use crate::scanner::scan_project;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub depth: Option<usize>,
    pub show_progress: bool,
}

pub fn handle_analyze(options: AnalyzeConfig) -> Result<()> {
    let mut config = resolve_config(options.config.as_deref(), &options.path)?;
    if let Some(depth) = options.depth {
        config.modules.depth = depth;
    }

    let engine = Engine::with_registry(config, LanguageRegistry::with_defaults());
    let input = scan_project(
        &options.path,
        engine.config(),
        engine.registry(),
        options.show_progress,
    )
    .with_context(|| format!("scanning {}", options.path.display()))?;

    let result = engine.analyze(&input).context("analysis failed")?;
    info!(
        modules = result.modules.len(),
        risks = result.risks.len(),
        "Analysis complete"
    );
    emit(&result, options.format, options.output.as_deref())
}
