//! Final assembly: recommendations and the Markdown contract document.

use tracing::debug;

use crate::config::RecommendationConfig;
use crate::core::{
    AnalysisResult, ArchitectureSummary, DependencyGraph, IntegrationPoint, Language, Metrics,
    Module, Result, Risk,
};
use crate::io::writers::MarkdownWriter;

/// Project-level facts shown in the contract overview.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub project_name: String,
    pub primary_language: Language,
    pub architecture: Option<ArchitectureSummary>,
}

/// Everything the contract document renders, borrowed from one run.
#[derive(Debug, Clone, Copy)]
pub struct ContractView<'a> {
    pub context: &'a ReportContext,
    pub modules: &'a [Module],
    pub graph: &'a DependencyGraph,
    pub integration_points: &'a [IntegrationPoint],
    pub metrics: &'a Metrics,
    pub risks: &'a [Risk],
    pub recommendations: &'a [String],
}

/// Deterministic advice derived only from `metrics` and the configured limits.
pub fn generate_recommendations(metrics: &Metrics, limits: &RecommendationConfig) -> Vec<String> {
    if metrics.total_modules == 0 {
        return vec![
            "No modules were identified; check the ignore list and module depth settings."
                .to_string(),
        ];
    }

    let mut recommendations = Vec::new();

    if metrics.avg_complexity > limits.max_complexity {
        recommendations.push(format!(
            "Refactor complex modules: average module complexity is {:.1}, above the limit of {:.1}.",
            metrics.avg_complexity, limits.max_complexity
        ));
    }
    if metrics.avg_test_coverage < limits.min_test_coverage {
        recommendations.push(format!(
            "Add tests: estimated test coverage is {:.0}%, below the {:.0}% target.",
            metrics.avg_test_coverage, limits.min_test_coverage
        ));
    }
    if metrics.documentation_coverage < 1.0 {
        let documented =
            (metrics.documentation_coverage * metrics.total_modules as f64).round() as usize;
        recommendations.push(format!(
            "Add documentation: {} of {} modules have no README or documentation files.",
            metrics.total_modules.saturating_sub(documented),
            metrics.total_modules
        ));
    }
    if metrics.coupling > limits.max_coupling {
        recommendations.push(format!(
            "Reduce coupling: {:.2} of possible module dependencies are in use (limit {:.2}); \
             introduce interfaces or merge tightly bound modules.",
            metrics.coupling, limits.max_coupling
        ));
    }
    if metrics.cohesion < limits.min_cohesion {
        recommendations.push(format!(
            "Improve cohesion: average module cohesion is {:.2}, below {:.2}; \
             group related functions and split catch-all modules.",
            metrics.cohesion, limits.min_cohesion
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(
            "No structural issues detected; keep current module boundaries.".to_string(),
        );
    }
    recommendations
}

pub fn render_contract(view: &ContractView<'_>) -> Result<String> {
    let mut buffer = Vec::new();
    MarkdownWriter::new(&mut buffer).write_contract(view)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub struct ReportAssembler<'a> {
    context: &'a ReportContext,
    limits: &'a RecommendationConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(context: &'a ReportContext, limits: &'a RecommendationConfig) -> Self {
        Self { context, limits }
    }

    pub fn assemble(
        &self,
        modules: Vec<Module>,
        graph: DependencyGraph,
        integration_points: Vec<IntegrationPoint>,
        metrics: Metrics,
        risks: Vec<Risk>,
    ) -> Result<AnalysisResult> {
        let recommendations = generate_recommendations(&metrics, self.limits);
        let contract_document = render_contract(&ContractView {
            context: self.context,
            modules: &modules,
            graph: &graph,
            integration_points: &integration_points,
            metrics: &metrics,
            risks: &risks,
            recommendations: &recommendations,
        })?;
        debug!(
            bytes = contract_document.len(),
            recommendations = recommendations.len(),
            "Assembled report"
        );

        Ok(AnalysisResult {
            modules,
            dependencies: graph,
            integration_points,
            metrics,
            risks,
            recommendations,
            contract_document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> Metrics {
        Metrics {
            total_modules: 3,
            total_relations: 2,
            cohesion: 0.6,
            coupling: 0.33,
            maintainability_index: 0.8,
            quality_score: 85.0,
            complexity_score: 4.7,
            avg_complexity: 4.0,
            avg_test_coverage: 80.0,
            interface_count: 6,
            documentation_coverage: 1.0,
            unresolved_imports: 0,
            modules: Vec::new(),
        }
    }

    #[test]
    fn healthy_metrics_get_single_message() {
        let recommendations = generate_recommendations(&healthy(), &RecommendationConfig::default());
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].starts_with("No structural issues"));
    }

    #[test]
    fn each_threshold_adds_its_recommendation() {
        let metrics = Metrics {
            avg_complexity: 12.5,
            avg_test_coverage: 20.0,
            documentation_coverage: 1.0 / 3.0,
            coupling: 0.75,
            cohesion: 0.1,
            ..healthy()
        };
        let recommendations = generate_recommendations(&metrics, &RecommendationConfig::default());
        let prefixes: Vec<&str> = recommendations
            .iter()
            .map(|r| r.split(':').next().unwrap_or_default())
            .collect();
        assert_eq!(
            prefixes,
            vec![
                "Refactor complex modules",
                "Add tests",
                "Add documentation",
                "Reduce coupling",
                "Improve cohesion"
            ]
        );
        assert!(recommendations[2].contains("2 of 3 modules"));
    }

    #[test]
    fn recommendations_are_deterministic() {
        let limits = RecommendationConfig::default();
        let metrics = Metrics {
            avg_complexity: 9.0,
            ..healthy()
        };
        assert_eq!(
            generate_recommendations(&metrics, &limits),
            generate_recommendations(&metrics.clone(), &limits)
        );
    }

    #[test]
    fn empty_project_gets_guidance() {
        let recommendations =
            generate_recommendations(&Metrics::default(), &RecommendationConfig::default());
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].contains("No modules"));
    }
}
