//! Promotion of dependency edges to ranked integration points.

use xxhash_rust::xxh64::xxh64;

use super::metrics::round_to;
use crate::config::IntegrationConfig;
use crate::core::{
    DependencyEdge, DependencyGraph, FileCategory, IntegrationKind, IntegrationPoint, Module,
    ModuleType,
};

/// Architectural role of a `source -> target` relationship, from the module
/// types and the dominant file category of the target.
pub fn classify_relationship(source: &Module, target: &Module) -> IntegrationKind {
    use ModuleType::*;

    if source.module_type == Test {
        return IntegrationKind::ModuleIntegration;
    }
    if target.module_type == Config || is_config_only(target) {
        return IntegrationKind::Configuration;
    }
    if source.module_type == Middleware || target.module_type == Middleware {
        return IntegrationKind::CrossCutting;
    }

    match (source.module_type, target.module_type) {
        (Model, Model) => IntegrationKind::ModuleIntegration,
        (_, Model) => IntegrationKind::DataAccess,
        (Controller, Service | Core | Business) => IntegrationKind::RequestHandling,
        (View, Controller | Service) => IntegrationKind::Presentation,
        (Service, Service) => IntegrationKind::ModuleIntegration,
        (_, Service) | (Core, _) => IntegrationKind::ServiceIntegration,
        _ => IntegrationKind::ModuleIntegration,
    }
}

fn is_config_only(module: &Module) -> bool {
    !module.files.is_empty()
        && module
            .files
            .iter()
            .all(|f| f.category() == FileCategory::Config)
}

/// `ip_` plus a hash of the module pair, stable across runs.
pub fn integration_point_id(edge: &DependencyEdge) -> String {
    let key = format!("{}->{}", edge.source, edge.target);
    format!("ip_{:016x}", xxh64(key.as_bytes(), 0))
}

pub struct IntegrationPointDetector<'a> {
    config: &'a IntegrationConfig,
}

impl<'a> IntegrationPointDetector<'a> {
    pub fn new(config: &'a IntegrationConfig) -> Self {
        Self { config }
    }

    pub fn complexity(&self, edge: &DependencyEdge, source: &Module, target: &Module) -> f64 {
        let modules = f64::from(source.complexity.saturating_add(target.complexity));
        round_to(
            f64::from(edge.strength) * self.config.strength_weight
                + modules / self.config.complexity_divisor,
            1,
        )
    }

    /// Strong edges and boundary-crossing edges, most complex first.
    pub fn detect(&self, modules: &[Module], graph: &DependencyGraph) -> Vec<IntegrationPoint> {
        let mut points: Vec<IntegrationPoint> = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = &modules[graph.index_of(&edge.source)?];
                let target = &modules[graph.index_of(&edge.target)?];
                let kind = classify_relationship(source, target);
                let promoted =
                    edge.strength >= self.config.strong_strength || kind.crosses_boundary();
                promoted.then(|| IntegrationPoint {
                    id: integration_point_id(edge),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    source_name: source.name.clone(),
                    target_name: target.name.clone(),
                    kind,
                    import: edge.import.clone(),
                    strength: edge.strength,
                    complexity: self.complexity(edge, source, target),
                })
            })
            .collect();

        points.sort_by(|a, b| b.complexity.total_cmp(&a.complexity));
        points
    }
}
