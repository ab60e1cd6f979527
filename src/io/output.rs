use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::core::AnalysisResult;
use crate::io::writers::{JsonWriter, MarkdownWriter, TerminalWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_results(&mut self, results: &AnalysisResult) -> anyhow::Result<()>;
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(std::io::stdout())),
    }
}

/// Writer targeting `path`. Terminal output written to a file has no colors.
pub fn create_file_writer(format: OutputFormat, path: &Path) -> anyhow::Result<Box<dyn OutputWriter>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let sink: Box<dyn Write> = Box::new(BufWriter::new(file));
    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink).plain()),
    })
}
