//! Single-pass analysis pipeline.
//!
//! Identify -> Aggregate -> Build graph -> Metrics -> Integration points ->
//! Risks -> Assemble. Every stage is a pure transformation of the previous
//! stage's output; a missing prerequisite aborts before any stage runs.

use tracing::{debug, info, info_span};

use super::aggregate::FeatureAggregator;
use super::graph::DependencyGraphBuilder;
use super::integration::IntegrationPointDetector;
use super::metrics::calculate_metrics;
use super::modules::ModuleIdentifier;
use super::report::{ReportAssembler, ReportContext};
use super::risk::RiskAnalyzer;
use crate::config::ArchmapConfig;
use crate::core::{
    AnalysisInput, AnalysisResult, Error, FileRecord, LanguageSummary, Prerequisite,
    ProjectStructure, Result,
};
use crate::languages::LanguageRegistry;

/// Required inputs borrowed from a validated [`AnalysisInput`].
struct Prerequisites<'a> {
    structure: &'a ProjectStructure,
    language: &'a LanguageSummary,
    files: &'a [FileRecord],
}

/// Checked in dependency order so the first absent set is the one reported.
fn check_prerequisites(input: &AnalysisInput) -> Result<Prerequisites<'_>> {
    let structure = input
        .structure
        .as_ref()
        .ok_or_else(|| Error::MissingPrerequisite(Prerequisite::ProjectStructure))?;
    let language = input
        .language
        .as_ref()
        .ok_or_else(|| Error::MissingPrerequisite(Prerequisite::PrimaryLanguage))?;
    let files = input
        .files
        .as_deref()
        .ok_or_else(|| Error::MissingPrerequisite(Prerequisite::FileAnalysis))?;
    Ok(Prerequisites {
        structure,
        language,
        files,
    })
}

fn project_name(input: &AnalysisInput) -> String {
    input
        .project_root
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| input.project_root.display().to_string())
}

/// Configured analysis engine. Holds no state between runs.
pub struct Engine {
    config: ArchmapConfig,
    registry: LanguageRegistry,
}

impl Engine {
    pub fn new(config: ArchmapConfig) -> Self {
        Self::with_registry(config, LanguageRegistry::with_defaults())
    }

    pub fn with_registry(config: ArchmapConfig, registry: LanguageRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ArchmapConfig {
        &self.config
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult> {
        analyze(input, &self.config, &self.registry)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ArchmapConfig::default())
    }
}

/// Run the whole pipeline over one snapshot.
pub fn analyze(
    input: &AnalysisInput,
    config: &ArchmapConfig,
    registry: &LanguageRegistry,
) -> Result<AnalysisResult> {
    config.validate()?;
    let prerequisites = check_prerequisites(input)?;

    let span = info_span!(
        "analysis",
        project = %input.project_root.display(),
        files = prerequisites.files.len()
    );
    let _enter = span.enter();
    info!("Analyzing module structure");

    let modules = {
        let _span = info_span!("identify_modules").entered();
        let candidates = ModuleIdentifier::new(config)
            .identify(prerequisites.files, prerequisites.structure);
        FeatureAggregator::new(registry).aggregate(candidates)
    };

    let build = {
        let _span = info_span!("dependency_graph").entered();
        DependencyGraphBuilder::new(&modules, &config.scoring).build()
    };

    let metrics = {
        let _span = info_span!("metrics").entered();
        calculate_metrics(&modules, &build.graph, build.unresolved_imports)
    };

    let integration_points = {
        let _span = info_span!("integration_points").entered();
        IntegrationPointDetector::new(&config.integration).detect(&modules, &build.graph)
    };

    let risks = {
        let _span = info_span!("risks").entered();
        RiskAnalyzer::new(&config.risks).analyze(&modules, &build.graph)
    };

    debug!(
        modules = modules.len(),
        edges = build.graph.edge_count(),
        integration_points = integration_points.len(),
        risks = risks.len(),
        "Analysis stages complete"
    );

    let context = ReportContext {
        project_name: project_name(input),
        primary_language: prerequisites.language.primary,
        architecture: input.architecture.clone(),
    };
    ReportAssembler::new(&context, &config.recommendations).assemble(
        modules,
        build.graph,
        integration_points,
        metrics,
        risks,
    )
}
