//! CLI command implementations for archmap.
//!
//! - **analyze**: scan a directory tree, then run the analysis engine
//! - **report**: run the engine over a serialized input snapshot
//! - **init**: write a default `.archmap.toml`

pub mod analyze;
pub mod init;
pub mod report;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use init::init_config;
pub use report::{handle_report, ReportConfig};

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::config::{load_config, load_config_file, ArchmapConfig};
use crate::core::AnalysisResult;
use crate::io::output::{create_file_writer, create_writer};

/// Explicit `--config` wins; otherwise search from `start` upwards.
pub(crate) fn resolve_config(explicit: Option<&Path>, start: &Path) -> Result<ArchmapConfig> {
    match explicit {
        Some(path) => load_config_file(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(load_config(start)),
    }
}

pub(crate) fn emit(result: &AnalysisResult, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let mut writer = match output {
        Some(path) => create_file_writer(format.into(), path)?,
        None => create_writer(format.into()),
    };
    writer.write_results(result)
}
