//! Markdown module integration contract.
//!
//! Sections appear in a fixed order: overview, architecture diagram (Mermaid),
//! modules with their public interfaces, relationship statistics,
//! integration points, risks and recommendations. The document contains no
//! timestamps, so identical analyses render identical text.

use std::io::{self, Write};

use crate::core::AnalysisResult;
use crate::engine::ContractView;
use crate::io::output::OutputWriter;

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_contract(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        let sections: Vec<fn(&mut Self, &ContractView<'_>) -> io::Result<()>> = vec![
            |w, v| w.write_header(v),
            |w, v| w.write_overview(v),
            |w, v| w.write_architecture_diagram(v),
            |w, v| w.write_modules(v),
            |w, v| w.write_relationship_statistics(v),
            |w, v| w.write_integration_points(v),
            |w, v| w.write_risks(v),
            |w, v| w.write_recommendations(v),
        ];

        sections.iter().try_for_each(|section| section(self, view))
    }

    fn write_header(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(
            self.writer,
            "# Module Integration Contract: {}",
            view.context.project_name
        )?;
        writeln!(self.writer)
    }

    fn write_overview(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(self.writer, "## Overview")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "- **Primary language:** {}",
            view.context.primary_language
        )?;
        if let Some(architecture) = &view.context.architecture {
            if let Some(pattern) = &architecture.pattern {
                writeln!(self.writer, "- **Architecture pattern:** {}", pattern)?;
            }
            if !architecture.layers.is_empty() {
                writeln!(self.writer, "- **Layers:** {}", architecture.layers.join(", "))?;
            }
        }
        writeln!(self.writer, "- **Modules:** {}", view.metrics.total_modules)?;
        writeln!(self.writer, "- **Dependencies:** {}", view.metrics.total_relations)?;
        writeln!(
            self.writer,
            "- **Quality score:** {:.1} / 100",
            view.metrics.quality_score
        )?;
        writeln!(
            self.writer,
            "- **Maintainability index:** {:.2}",
            view.metrics.maintainability_index
        )?;
        if let Some(notes) = view
            .context
            .architecture
            .as_ref()
            .and_then(|a| a.notes.as_ref())
        {
            writeln!(self.writer)?;
            writeln!(self.writer, "{}", notes)?;
        }
        writeln!(self.writer)
    }

    fn write_architecture_diagram(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(self.writer, "## Architecture Diagram")?;
        writeln!(self.writer)?;
        if view.graph.nodes.is_empty() {
            writeln!(self.writer, "_No modules identified._")?;
            return writeln!(self.writer);
        }

        writeln!(self.writer, "```mermaid")?;
        writeln!(self.writer, "graph TD")?;
        for (index, node) in view.graph.nodes.iter().enumerate() {
            writeln!(
                self.writer,
                "    n{}[\"{} ({})\"]",
                index,
                node.name.replace('"', "'"),
                node.module_type
            )?;
        }
        for edge in &view.graph.edges {
            if let (Some(source), Some(target)) = (
                view.graph.index_of(&edge.source),
                view.graph.index_of(&edge.target),
            ) {
                writeln!(self.writer, "    n{} -->|{}| n{}", source, edge.strength, target)?;
            }
        }
        writeln!(self.writer, "```")?;
        writeln!(self.writer)
    }

    fn write_modules(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(self.writer, "## Modules")?;
        writeln!(self.writer)?;
        if view.modules.is_empty() {
            writeln!(self.writer, "_No modules identified._")?;
            return writeln!(self.writer);
        }

        writeln!(
            self.writer,
            "| Module | Type | Path | Files | Complexity | Test Coverage | Responsibility |"
        )?;
        writeln!(
            self.writer,
            "|--------|------|------|-------|------------|---------------|----------------|"
        )?;
        for module in view.modules {
            writeln!(
                self.writer,
                "| {} | {} | `{}` | {} | {} | {:.0}% | {} |",
                escape_cell(&module.name),
                module.module_type,
                module.root_path,
                module.file_count(),
                module.complexity,
                module.test_coverage,
                escape_cell(&module.responsibility)
            )?;
        }
        writeln!(self.writer)?;

        for module in view.modules.iter().filter(|m| !m.interfaces.is_empty()) {
            writeln!(self.writer, "### {} interfaces", module.name)?;
            writeln!(self.writer)?;
            for interface in &module.interfaces {
                writeln!(
                    self.writer,
                    "- `{}` ({:?}, `{}`)",
                    interface.name, interface.kind, interface.file
                )?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_relationship_statistics(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        let metrics = view.metrics;
        writeln!(self.writer, "## Relationship Statistics")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;

        let rows = [
            ("Total modules", metrics.total_modules.to_string()),
            ("Total relations", metrics.total_relations.to_string()),
            ("Cohesion", format!("{:.2}", metrics.cohesion)),
            ("Coupling", format!("{:.2}", metrics.coupling)),
            (
                "Maintainability index",
                format!("{:.2}", metrics.maintainability_index),
            ),
            ("Quality score", format!("{:.1}", metrics.quality_score)),
            ("Complexity score", format!("{:.1}", metrics.complexity_score)),
            ("Average complexity", format!("{:.2}", metrics.avg_complexity)),
            (
                "Average test coverage",
                format!("{:.1}%", metrics.avg_test_coverage),
            ),
            ("Public interfaces", metrics.interface_count.to_string()),
            (
                "Documentation coverage",
                format!("{:.0}%", metrics.documentation_coverage * 100.0),
            ),
            ("Unresolved imports", metrics.unresolved_imports.to_string()),
        ];
        for (name, value) in rows {
            writeln!(self.writer, "| {} | {} |", name, value)?;
        }
        writeln!(self.writer)
    }

    fn write_integration_points(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(self.writer, "## Integration Points")?;
        writeln!(self.writer)?;
        if view.integration_points.is_empty() {
            writeln!(self.writer, "_No integration points detected._")?;
            return writeln!(self.writer);
        }

        writeln!(
            self.writer,
            "| Source | Target | Kind | Import | Strength | Complexity |"
        )?;
        writeln!(
            self.writer,
            "|--------|--------|------|--------|----------|------------|"
        )?;
        for point in view.integration_points {
            writeln!(
                self.writer,
                "| {} | {} | {} | `{}` | {} | {:.1} |",
                escape_cell(&point.source_name),
                escape_cell(&point.target_name),
                point.kind,
                escape_cell(&point.import),
                point.strength,
                point.complexity
            )?;
        }
        writeln!(self.writer)
    }

    fn write_risks(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(self.writer, "## Risks")?;
        writeln!(self.writer)?;
        if view.risks.is_empty() {
            writeln!(self.writer, "_No structural risks detected._")?;
            return writeln!(self.writer);
        }
        for risk in view.risks {
            writeln!(
                self.writer,
                "- **{}** `{}`: {}",
                risk.severity.to_string().to_uppercase(),
                risk.kind,
                risk.description
            )?;
        }
        writeln!(self.writer)
    }

    fn write_recommendations(&mut self, view: &ContractView<'_>) -> io::Result<()> {
        writeln!(self.writer, "## Recommendations")?;
        writeln!(self.writer)?;
        for (index, recommendation) in view.recommendations.iter().enumerate() {
            writeln!(self.writer, "{}. {}", index + 1, recommendation)?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_results(&mut self, results: &AnalysisResult) -> anyhow::Result<()> {
        self.writer.write_all(results.contract_document.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
