//! Structural risks: dependency cycles, coupling hubs and untested modules.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::RiskConfig;
use crate::core::{DependencyGraph, Module, ModuleType, Risk, RiskKind, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

/// Cycles up to this many modules are enumerated exhaustively.
pub const MAX_ENUMERATED_CYCLE_LENGTH: usize = 8;

/// Every distinct cycle in `graph` as node indices, rotated to start at the
/// smallest index, shortest first.
///
/// Elementary cycles up to [`MAX_ENUMERATED_CYCLE_LENGTH`] are enumerated from
/// each start node over the nodes with a higher index. Longer cycles come from
/// a visited/on-stack depth-first search, where a successor still on the
/// current path closes a cycle.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    let mut seen: BTreeSet<Vec<usize>> = BTreeSet::new();
    let mut on_path = vec![false; graph.node_count()];
    for start in 0..graph.node_count() {
        short_cycles_from(graph, start, &mut on_path, &mut seen);
    }
    back_edge_cycles(graph, &mut seen);

    let mut cycles: Vec<Vec<usize>> = seen.into_iter().collect();
    cycles.sort_by_key(Vec::len);
    cycles
}

/// Cycles through `start` whose other nodes all have a higher index.
fn short_cycles_from(
    graph: &DependencyGraph,
    start: usize,
    on_path: &mut [bool],
    seen: &mut BTreeSet<Vec<usize>>,
) {
    let mut path = vec![start];
    let mut frames: Vec<(usize, usize)> = vec![(start, 0)];
    on_path[start] = true;

    while let Some(frame) = frames.last_mut() {
        let (node, next) = *frame;
        let Some(&successor) = graph.successors(node).get(next) else {
            on_path[node] = false;
            path.pop();
            frames.pop();
            continue;
        };
        frame.1 += 1;

        if successor == start {
            seen.insert(path.clone());
        } else if successor > start
            && !on_path[successor]
            && path.len() < MAX_ENUMERATED_CYCLE_LENGTH
        {
            on_path[successor] = true;
            path.push(successor);
            frames.push((successor, 0));
        }
    }
}

fn back_edge_cycles(graph: &DependencyGraph, seen: &mut BTreeSet<Vec<usize>>) {
    let node_count = graph.node_count();
    let mut state = vec![VisitState::Unvisited; node_count];
    let mut path: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for start in 0..node_count {
        if state[start] != VisitState::Unvisited {
            continue;
        }
        state[start] = VisitState::OnStack;
        path.push(start);
        frames.push((start, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let Some(&successor) = graph.successors(node).get(next) else {
                state[node] = VisitState::Done;
                path.pop();
                frames.pop();
                continue;
            };
            frame.1 += 1;

            match state[successor] {
                VisitState::Unvisited => {
                    state[successor] = VisitState::OnStack;
                    path.push(successor);
                    frames.push((successor, 0));
                }
                VisitState::OnStack => {
                    if let Some(position) = path.iter().position(|&n| n == successor) {
                        seen.insert(canonical_rotation(&path[position..]));
                    }
                }
                VisitState::Done => {}
            }
        }
    }
}

fn canonical_rotation(cycle: &[usize]) -> Vec<usize> {
    let offset = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| **node)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[offset..]
        .iter()
        .chain(&cycle[..offset])
        .copied()
        .collect()
}

/// Shorter cycles bind modules more tightly.
pub fn cycle_severity(length: usize) -> Severity {
    match length {
        0..=2 => Severity::Critical,
        3 => Severity::High,
        4..=5 => Severity::Medium,
        _ => Severity::Low,
    }
}

pub struct RiskAnalyzer<'a> {
    config: &'a RiskConfig,
}

impl<'a> RiskAnalyzer<'a> {
    pub fn new(config: &'a RiskConfig) -> Self {
        Self { config }
    }

    /// Cycles first, then coupling hubs, then untested modules.
    pub fn analyze(&self, modules: &[Module], graph: &DependencyGraph) -> Vec<Risk> {
        let mut risks = self.cycle_risks(modules, graph);
        risks.extend(self.coupling_risks(modules, graph));
        risks.extend(self.untested_risks(modules));
        debug!(risks = risks.len(), "Structural risks detected");
        risks
    }

    fn cycle_risks(&self, modules: &[Module], graph: &DependencyGraph) -> Vec<Risk> {
        find_cycles(graph)
            .into_iter()
            .map(|cycle| {
                let names: Vec<String> = cycle.iter().map(|&i| modules[i].name.clone()).collect();
                let description = format!(
                    "Circular dependency: {} -> {}",
                    names.join(" -> "),
                    names.first().map(String::as_str).unwrap_or_default()
                );
                Risk {
                    kind: RiskKind::CircularDependency,
                    modules: cycle.iter().map(|&i| modules[i].id.clone()).collect(),
                    severity: cycle_severity(cycle.len()),
                    path: names,
                    description,
                }
            })
            .collect()
    }

    fn coupling_risks(&self, modules: &[Module], graph: &DependencyGraph) -> Vec<Risk> {
        modules
            .iter()
            .enumerate()
            .filter_map(|(index, module)| {
                let fan_in = graph.fan_in(index);
                let fan_out = graph.fan_out(index);
                (fan_in + fan_out >= self.config.hub_threshold).then(|| Risk {
                    kind: RiskKind::HighCoupling,
                    modules: vec![module.id.clone()],
                    path: vec![module.name.clone()],
                    severity: Severity::Medium,
                    description: format!(
                        "Module '{}' is a coupling hub ({} incoming, {} outgoing dependencies)",
                        module.name, fan_in, fan_out
                    ),
                })
            })
            .collect()
    }

    fn untested_risks(&self, modules: &[Module]) -> Vec<Risk> {
        modules
            .iter()
            .filter(|m| m.module_type != ModuleType::Test)
            .filter(|m| m.test_coverage == 0.0)
            .filter(|m| m.complexity >= self.config.untested_complexity)
            .filter(|m| m.files.iter().any(|f| f.is_source()))
            .map(|module| Risk {
                kind: RiskKind::UntestedModule,
                modules: vec![module.id.clone()],
                path: vec![module.name.clone()],
                severity: Severity::Low,
                description: format!(
                    "Module '{}' has complexity {} and no test files",
                    module.name, module.complexity
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DependencyEdge, EdgeKind, FileRecord, GraphNode, ModuleId};
    use crate::engine::aggregate::FeatureAggregator;
    use crate::engine::modules::ModuleCandidate;
    use crate::languages::LanguageRegistry;

    fn modules(count: usize, complexity: u32) -> Vec<Module> {
        let registry = LanguageRegistry::empty();
        let aggregator = FeatureAggregator::new(&registry);
        (0..count)
            .map(|i| {
                let mut record = FileRecord::new(format!("m{}/index.ts", i));
                record.complexity = Some(complexity);
                aggregator.aggregate_module(ModuleCandidate {
                    name: format!("m{}", i),
                    root_path: format!("m{}", i),
                    module_type: ModuleType::Business,
                    responsibility: String::new(),
                    files: vec![record],
                })
            })
            .collect()
    }

    fn graph(count: usize, edges: &[(usize, usize)]) -> DependencyGraph {
        let id = |i: usize| ModuleId::from_root_path(&format!("m{}", i));
        let nodes = (0..count)
            .map(|i| GraphNode {
                id: id(i),
                name: format!("m{}", i),
                module_type: ModuleType::Business,
            })
            .collect();
        let edges = edges
            .iter()
            .map(|&(s, t)| DependencyEdge {
                source: id(s),
                target: id(t),
                kind: EdgeKind::Import,
                import: format!("m{}", t),
                strength: 1,
            })
            .collect();
        DependencyGraph::new(nodes, edges)
    }

    #[test]
    fn three_node_ring_is_one_cycle() {
        let cycles = find_cycles(&graph(3, &[(0, 1), (1, 2), (2, 0)]));
        assert_eq!(cycles, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn mutual_dependency_inside_a_ring_is_reported() {
        let cycles = find_cycles(&graph(3, &[(0, 1), (0, 2), (1, 2), (2, 0)]));
        assert_eq!(cycles, vec![vec![0, 2], vec![0, 1, 2]]);
    }

    #[test]
    fn nested_cycles_are_listed_separately() {
        let cycles = find_cycles(&graph(4, &[(0, 1), (1, 2), (2, 1), (2, 3), (3, 1)]));
        assert_eq!(cycles, vec![vec![1, 2], vec![1, 2, 3]]);
    }

    #[test]
    fn long_rings_beyond_enumeration_limit_are_still_found() {
        let length = MAX_ENUMERATED_CYCLE_LENGTH + 2;
        let edges: Vec<(usize, usize)> = (0..length).map(|i| (i, (i + 1) % length)).collect();
        let cycles = find_cycles(&graph(length, &edges));
        assert_eq!(cycles, vec![(0..length).collect::<Vec<_>>()]);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let cycles = find_cycles(&graph(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]));
        assert!(cycles.is_empty());
        assert!(find_cycles(&graph(0, &[])).is_empty());
    }

    #[test]
    fn separate_cycles_are_all_reported() {
        let cycles = find_cycles(&graph(5, &[(0, 1), (1, 0), (2, 3), (3, 4), (4, 2)]));
        assert_eq!(cycles, vec![vec![0, 1], vec![2, 3, 4]]);
    }

    #[test]
    fn severity_scales_with_cycle_length() {
        assert_eq!(cycle_severity(2), Severity::Critical);
        assert_eq!(cycle_severity(3), Severity::High);
        assert_eq!(cycle_severity(5), Severity::Medium);
        assert_eq!(cycle_severity(8), Severity::Low);
    }

    #[test]
    fn canonical_rotation_starts_at_smallest_index() {
        assert_eq!(canonical_rotation(&[4, 2, 7]), vec![2, 7, 4]);
        assert_eq!(canonical_rotation(&[]), Vec::<usize>::new());
    }

    #[test]
    fn ring_of_modules_yields_one_named_cycle_risk() {
        let modules = modules(3, 1);
        let config = RiskConfig::default();
        let risks =
            RiskAnalyzer::new(&config).analyze(&modules, &graph(3, &[(0, 1), (1, 2), (2, 0)]));

        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].kind, RiskKind::CircularDependency);
        assert_eq!(risks[0].path, vec!["m0", "m1", "m2"]);
        assert_eq!(risks[0].severity, Severity::High);
        assert_eq!(risks[0].description, "Circular dependency: m0 -> m1 -> m2 -> m0");
    }

    #[test]
    fn hubs_and_untested_modules_are_flagged() {
        let modules = modules(4, 12);
        let config = RiskConfig {
            hub_threshold: 3,
            untested_complexity: 10,
        };
        let risks =
            RiskAnalyzer::new(&config).analyze(&modules, &graph(4, &[(1, 0), (2, 0), (3, 0)]));

        let kinds: Vec<(RiskKind, &str)> = risks
            .iter()
            .map(|r| (r.kind, r.path[0].as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (RiskKind::HighCoupling, "m0"),
                (RiskKind::UntestedModule, "m0"),
                (RiskKind::UntestedModule, "m1"),
                (RiskKind::UntestedModule, "m2"),
                (RiskKind::UntestedModule, "m3"),
            ]
        );
    }
}
