//! Structural quality metrics over the module graph.
//!
//! Every ratio guards its denominator: an empty project yields all-zero
//! metrics and a single module has zero coupling.

use crate::core::{DependencyGraph, Metrics, Module, ModuleMetrics};

/// Functions per file at which a module counts as fully cohesive.
pub const COHESIVE_FUNCTIONS_PER_FILE: f64 = 5.0;

/// Average module complexity treated as the upper end of the healthy range.
pub const COMPLEXITY_CEILING: f64 = 10.0;

const MAINTAINABILITY_COHESION_WEIGHT: f64 = 0.4;
const MAINTAINABILITY_COUPLING_WEIGHT: f64 = 0.3;
const MAINTAINABILITY_COMPLEXITY_WEIGHT: f64 = 0.3;

const QUALITY_COMPLEXITY_WEIGHT: f64 = 0.3;
const QUALITY_COVERAGE_WEIGHT: f64 = 0.4;
const QUALITY_INTERFACE_WEIGHT: f64 = 0.3;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `min(1, functions / max(1, files) / 5)`.
pub fn module_cohesion(module: &Module) -> f64 {
    let files = module.file_count().max(1) as f64;
    (module.functions.len() as f64 / files / COHESIVE_FUNCTIONS_PER_FILE).min(1.0)
}

/// Directed edge density: `edges / (n * (n - 1))`, 0 for fewer than two modules.
pub fn coupling(module_count: usize, edge_count: usize) -> f64 {
    if module_count <= 1 {
        return 0.0;
    }
    let possible = (module_count * (module_count - 1)) as f64;
    (edge_count as f64 / possible).min(1.0)
}

pub fn maintainability_index(cohesion: f64, coupling: f64, avg_complexity: f64) -> f64 {
    let complexity_term = (COMPLEXITY_CEILING - avg_complexity) / COMPLEXITY_CEILING;
    (cohesion * MAINTAINABILITY_COHESION_WEIGHT
        + (1.0 - coupling) * MAINTAINABILITY_COUPLING_WEIGHT
        + complexity_term * MAINTAINABILITY_COMPLEXITY_WEIGHT)
        .clamp(0.0, 1.0)
}

pub fn quality_score(
    module_count: usize,
    avg_complexity: f64,
    avg_test_coverage: f64,
    interface_count: usize,
) -> f64 {
    if module_count == 0 {
        return 0.0;
    }
    let complexity_term = (COMPLEXITY_CEILING - avg_complexity).max(0.0) / COMPLEXITY_CEILING;
    let interface_term = (interface_count as f64 / module_count as f64).min(1.0);
    100.0
        * (complexity_term * QUALITY_COMPLEXITY_WEIGHT
            + avg_test_coverage / 100.0 * QUALITY_COVERAGE_WEIGHT
            + interface_term * QUALITY_INTERFACE_WEIGHT)
}

/// Fan-in, fan-out and instability for each graph node.
pub fn module_metrics(modules: &[Module], graph: &DependencyGraph) -> Vec<ModuleMetrics> {
    modules
        .iter()
        .enumerate()
        .map(|(index, module)| {
            let fan_in = graph.fan_in(index);
            let fan_out = graph.fan_out(index);
            let instability = if fan_in + fan_out == 0 {
                0.0
            } else {
                fan_out as f64 / (fan_in + fan_out) as f64
            };
            ModuleMetrics {
                module_id: module.id.clone(),
                name: module.name.clone(),
                cohesion: round_to(module_cohesion(module), 2),
                fan_in,
                fan_out,
                instability: round_to(instability, 2),
            }
        })
        .collect()
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

pub fn calculate_metrics(
    modules: &[Module],
    graph: &DependencyGraph,
    unresolved_imports: usize,
) -> Metrics {
    let module_count = modules.len();
    let edge_count = graph.edge_count();
    if module_count == 0 {
        return Metrics {
            total_relations: edge_count,
            unresolved_imports,
            ..Metrics::default()
        };
    }

    let cohesion = mean(modules.iter().map(module_cohesion));
    let coupling = coupling(module_count, edge_count);
    let avg_complexity = mean(modules.iter().map(|m| f64::from(m.complexity)));
    let avg_test_coverage = mean(modules.iter().map(|m| m.test_coverage));
    let interface_count = modules.iter().map(|m| m.interfaces.len()).sum();
    let documented = modules.iter().filter(|m| m.has_documentation).count();

    Metrics {
        total_modules: module_count,
        total_relations: edge_count,
        cohesion: round_to(cohesion, 2),
        coupling: round_to(coupling, 2),
        maintainability_index: round_to(
            maintainability_index(cohesion, coupling, avg_complexity),
            2,
        ),
        quality_score: round_to(
            quality_score(module_count, avg_complexity, avg_test_coverage, interface_count),
            1,
        ),
        complexity_score: round_to(avg_complexity + edge_count as f64 / module_count as f64, 1),
        avg_complexity: round_to(avg_complexity, 2),
        avg_test_coverage: round_to(avg_test_coverage, 1),
        interface_count,
        documentation_coverage: round_to(documented as f64 / module_count as f64, 2),
        unresolved_imports,
        modules: module_metrics(modules, graph),
    }
}
