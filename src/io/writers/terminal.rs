use crate::core::{AnalysisResult, Metrics, Risk, Severity};
use crate::io::output::OutputWriter;
use colored::*;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table};
use std::io::Write;

/// Console summary: headline metrics, module table, integration points and
/// risks, followed by the recommendations.
pub struct TerminalWriter<W: Write> {
    writer: W,
    color: bool,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            color: true,
        }
    }

    /// Disable ANSI styling and box-drawing characters.
    pub fn plain(mut self) -> Self {
        self.color = false;
        self
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(if self.color { UTF8_FULL } else { ASCII_MARKDOWN })
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }

    fn write_header(&mut self, results: &AnalysisResult) -> anyhow::Result<()> {
        let rule = "═══════════════════════════════════════════";
        let title = results
            .contract_document
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("# "))
            .unwrap_or("Module Integration Contract");
        writeln!(self.writer, "{}", paint(self.color, rule, |s| s.cyan()))?;
        writeln!(self.writer, "{}", paint(self.color, title, |s| s.bold().cyan()))?;
        writeln!(self.writer, "{}", paint(self.color, rule, |s| s.cyan()))?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, metrics: &Metrics) -> anyhow::Result<()> {
        let quality = format!("{:.1}", metrics.quality_score);
        let quality = if metrics.quality_score >= 70.0 {
            paint(self.color, &quality, |s| s.green())
        } else if metrics.quality_score >= 40.0 {
            paint(self.color, &quality, |s| s.yellow())
        } else {
            paint(self.color, &quality, |s| s.red())
        };

        writeln!(self.writer, "{}", paint(self.color, "Summary", |s| s.bold()))?;
        writeln!(self.writer, "  Modules:          {}", metrics.total_modules)?;
        writeln!(self.writer, "  Dependencies:     {}", metrics.total_relations)?;
        writeln!(self.writer, "  Quality score:    {} / 100", quality)?;
        writeln!(
            self.writer,
            "  Maintainability:  {:.2}",
            metrics.maintainability_index
        )?;
        writeln!(
            self.writer,
            "  Cohesion/Coupling: {:.2} / {:.2}",
            metrics.cohesion, metrics.coupling
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_modules(&mut self, results: &AnalysisResult) -> anyhow::Result<()> {
        if results.modules.is_empty() {
            return Ok(());
        }
        let mut table = self.table();
        table.set_header(vec!["Module", "Type", "Files", "Complexity", "Tests", "Fan in/out"]);
        for (index, module) in results.modules.iter().enumerate() {
            let (fan_in, fan_out) = results
                .metrics
                .modules
                .get(index)
                .map(|m| (m.fan_in, m.fan_out))
                .unwrap_or_default();
            table.add_row(vec![
                module.name.clone(),
                module.module_type.to_string(),
                module.file_count().to_string(),
                module.complexity.to_string(),
                format!("{:.0}%", module.test_coverage),
                format!("{}/{}", fan_in, fan_out),
            ]);
        }
        writeln!(self.writer, "{}", paint(self.color, "Modules", |s| s.bold()))?;
        writeln!(self.writer, "{}", table)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_integration_points(&mut self, results: &AnalysisResult) -> anyhow::Result<()> {
        if results.integration_points.is_empty() {
            return Ok(());
        }
        let mut table = self.table();
        table.set_header(vec!["Source", "Target", "Kind", "Strength", "Complexity"]);
        for point in &results.integration_points {
            table.add_row(vec![
                point.source_name.clone(),
                point.target_name.clone(),
                point.kind.to_string(),
                point.strength.to_string(),
                format!("{:.1}", point.complexity),
            ]);
        }
        writeln!(self.writer, "{}", paint(self.color, "Integration points", |s| s.bold()))?;
        writeln!(self.writer, "{}", table)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_risks(&mut self, risks: &[Risk]) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", paint(self.color, "Risks", |s| s.bold()))?;
        if risks.is_empty() {
            writeln!(self.writer, "  {}", paint(self.color, "none detected", |s| s.green()))?;
        }
        for risk in risks {
            let label = risk.severity.to_string().to_uppercase();
            let label = match risk.severity {
                Severity::Critical => paint(self.color, &label, |s| s.red().bold()),
                Severity::High => paint(self.color, &label, |s| s.red()),
                Severity::Medium => paint(self.color, &label, |s| s.yellow()),
                Severity::Low => paint(self.color, &label, |s| s.dimmed()),
            };
            writeln!(self.writer, "  [{}] {}", label, risk.description)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_recommendations(&mut self, recommendations: &[String]) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", paint(self.color, "Recommendations", |s| s.bold()))?;
        for (index, recommendation) in recommendations.iter().enumerate() {
            writeln!(self.writer, "  {}. {}", index + 1, recommendation)?;
        }
        Ok(())
    }
}

fn paint(color: bool, text: &str, style: fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_results(&mut self, results: &AnalysisResult) -> anyhow::Result<()> {
        self.write_header(results)?;
        self.write_summary(&results.metrics)?;
        self.write_modules(results)?;
        self.write_integration_points(results)?;
        self.write_risks(&results.risks)?;
        self.write_recommendations(&results.recommendations)?;
        self.writer.flush()?;
        Ok(())
    }
}
