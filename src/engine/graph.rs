//! Import resolution and weighted module dependency edges.
//!
//! Every aggregated import string of a module is resolved to at most one
//! target module:
//!
//! - relative imports (`./x`, `../x`) are joined onto the importing file's
//!   directory and matched against the importing module first, then other
//!   module roots and owned files; paths that land nowhere fall back to
//!   fragment matching on names and file paths;
//! - any other import is matched against module names, exactly first and
//!   then by containment.
//!
//! Imports that resolve to nothing are counted, not reported as errors.
//! Resolving to the importing module itself produces no edge.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::core::{DependencyEdge, DependencyGraph, EdgeKind, GraphNode, Module, ModuleType};

/// Extensions stripped from the last segment of a relative import.
const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "py", "pyi", "rs", "go",
];

/// Graph plus resolution bookkeeping for one run.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub graph: DependencyGraph,
    pub unresolved_imports: usize,
}

pub struct DependencyGraphBuilder<'a> {
    modules: &'a [Module],
    scoring: &'a ScoringConfig,
}

enum Resolution {
    Target(usize),
    SelfReference,
    Unresolved,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(modules: &'a [Module], scoring: &'a ScoringConfig) -> Self {
        Self { modules, scoring }
    }

    pub fn build(&self) -> GraphBuild {
        let per_module: Vec<(Vec<DependencyEdge>, usize)> = (0..self.modules.len())
            .into_par_iter()
            .map(|index| self.module_edges(index))
            .collect();

        let unresolved_imports: usize = per_module.iter().map(|(_, unresolved)| unresolved).sum();
        let raw_edges: Vec<DependencyEdge> =
            per_module.into_iter().flat_map(|(edges, _)| edges).collect();
        let raw_count = raw_edges.len();
        let edges = sort_by_strength(deduplicate_edges(raw_edges));

        debug!(
            raw_edges = raw_count,
            edges = edges.len(),
            unresolved = unresolved_imports,
            "Built dependency graph"
        );

        let nodes = self
            .modules
            .iter()
            .map(|m| GraphNode {
                id: m.id.clone(),
                name: m.name.clone(),
                module_type: m.module_type,
            })
            .collect();

        GraphBuild {
            graph: DependencyGraph::new(nodes, edges),
            unresolved_imports,
        }
    }

    /// Edges from one module, in import order, plus its unresolved count.
    fn module_edges(&self, source: usize) -> (Vec<DependencyEdge>, usize) {
        let module = &self.modules[source];
        let mut edges = Vec::new();
        let mut unresolved = 0;

        for import in &module.imports {
            match self.resolve(import, source, None) {
                Resolution::Target(target) => edges.push(DependencyEdge {
                    source: module.id.clone(),
                    target: self.modules[target].id.clone(),
                    kind: EdgeKind::Import,
                    import: import.clone(),
                    strength: self.strength(source, target, import),
                }),
                Resolution::SelfReference => {}
                Resolution::Unresolved => unresolved += 1,
            }
        }
        (edges, unresolved)
    }

    /// `origin` is the importing file; without it every file of `source`
    /// carrying the import is tried in turn.
    fn resolve(&self, import: &str, source: usize, origin: Option<&str>) -> Resolution {
        let target = if is_relative(import) {
            self.resolve_relative(import, source, origin)
        } else {
            self.resolve_by_name(&strip_wildcard(import, &self.scoring.wildcard_marker))
        };
        match target {
            Some(t) if t == source => Resolution::SelfReference,
            Some(t) => Resolution::Target(t),
            None => Resolution::Unresolved,
        }
    }

    /// Index of the module `import` refers to, if any.
    pub fn resolve_target(
        &self,
        import: &str,
        source: usize,
        origin: Option<&str>,
    ) -> Option<usize> {
        match self.resolve(import, source, origin) {
            Resolution::Target(t) => Some(t),
            _ => None,
        }
    }

    fn resolve_relative(
        &self,
        import: &str,
        source: usize,
        origin: Option<&str>,
    ) -> Option<usize> {
        let origins: Vec<&str> = match origin {
            Some(path) => vec![path],
            None => self.modules[source]
                .files
                .iter()
                .filter(|f| f.imports.iter().any(|i| i == import))
                .map(|f| f.path.as_str())
                .collect(),
        };
        let bare = import.replace(self.scoring.wildcard_marker.as_str(), "");

        for origin in origins {
            if let Some(target) =
                join_relative(origin, &bare).and_then(|path| self.resolve_path(&path, source))
            {
                return Some(target);
            }
        }
        self.resolve_fragment(&relative_fragment(import, &self.scoring.wildcard_marker), source)
    }

    /// Module owning a normalized project path. The importing module wins
    /// over others, then the deepest enclosing root, then any owned file.
    fn resolve_path(&self, path: &str, source: usize) -> Option<usize> {
        let encloses =
            |m: &Module| m.module_type != ModuleType::Root && is_within(path, &m.root_path);
        let owns = |m: &Module| {
            m.files
                .iter()
                .any(|f| is_within(strip_extension(&f.path), path))
        };

        let own = &self.modules[source];
        if encloses(own) || owns(own) {
            return Some(source);
        }
        self.modules
            .iter()
            .enumerate()
            .filter(|&(_, m)| encloses(m))
            .max_by_key(|(_, m)| m.root_path.len())
            .map(|(index, _)| index)
            .or_else(|| self.modules.iter().position(owns))
    }

    /// Fallback for relative imports that do not land on a known path.
    fn resolve_fragment(&self, fragment: &str, source: usize) -> Option<usize> {
        if fragment.is_empty() {
            return None;
        }
        let owns_fragment = |m: &Module| {
            m.files
                .iter()
                .any(|f| strip_extension(&f.path).contains(fragment))
        };
        if owns_fragment(&self.modules[source]) {
            return Some(source);
        }

        let first_segment = fragment.split('/').next().unwrap_or_default();
        let by_root = self.modules.iter().position(|m| {
            m.root_path == fragment
                || fragment.starts_with(&format!("{}/", m.root_path))
                || (m.module_type != ModuleType::Root && m.name == first_segment)
        });
        by_root.or_else(|| self.modules.iter().position(owns_fragment))
    }

    fn resolve_by_name(&self, import: &str) -> Option<usize> {
        if import.is_empty() {
            return None;
        }
        let named = |m: &&Module| m.module_type != ModuleType::Root;

        if let Some(index) = self
            .modules
            .iter()
            .position(|m| named(&m) && m.name == import)
        {
            return Some(index);
        }

        // the most specific path segment wins: `@app/services/billing` -> billing
        for segment in import_segments(import).iter().rev() {
            if let Some(index) = self
                .modules
                .iter()
                .position(|m| named(&m) && m.name == *segment)
            {
                return Some(index);
            }
        }

        self.modules
            .iter()
            .position(|m| named(&m) && import.contains(m.name.as_str()))
    }

    /// Base strength, plus the wildcard bonus, plus the multi-file bonus when
    /// more than one file of the source module imports the target.
    pub fn strength(&self, source: usize, target: usize, import: &str) -> u32 {
        let mut strength = self.scoring.base_strength;
        if import.contains(self.scoring.wildcard_marker.as_str()) {
            strength += self.scoring.wildcard_bonus;
        }
        if self.referencing_files(source, target) > 1 {
            strength += self.scoring.multi_file_bonus;
        }
        strength
    }

    fn referencing_files(&self, source: usize, target: usize) -> usize {
        self.modules[source]
            .files
            .iter()
            .filter(|file| {
                file.imports
                    .iter()
                    .any(|import| {
                        self.resolve_target(import, source, Some(&file.path)) == Some(target)
                    })
            })
            .count()
    }
}

fn is_relative(import: &str) -> bool {
    import.starts_with("./") || import.starts_with("../")
}

fn strip_wildcard(import: &str, marker: &str) -> String {
    import
        .replace(marker, "")
        .trim_end_matches(['/', '.', ':'])
        .to_string()
}

/// `src/auth/login.ts` + `../db/client.ts` -> `src/db/client`. `None` when
/// the import climbs above the project root.
fn join_relative(origin: &str, import: &str) -> Option<String> {
    let mut segments: Vec<&str> = origin
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    segments.pop();
    for segment in import.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            name => segments.push(name),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(strip_extension(&segments.join("/")).to_string())
}

/// `path` equals `prefix` or lies beneath it.
fn is_within(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// `../db/client.ts` -> `db/client`, `./models/*` -> `models`.
fn relative_fragment(import: &str, marker: &str) -> String {
    let stripped = strip_wildcard(import, marker);
    let segments: Vec<&str> = stripped
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    strip_extension(&segments.join("/")).to_string()
}

fn strip_extension(path: &str) -> &str {
    match path.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.contains('/') && SOURCE_EXTENSIONS.contains(&ext) =>
        {
            stem
        }
        _ => path,
    }
}

fn import_segments(import: &str) -> Vec<&str> {
    import
        .split(['/', '.', ':', '@'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Collapse repeated (source, target) pairs into the first edge seen,
/// keeping the highest strength and the import that produced it.
pub fn deduplicate_edges(edges: Vec<DependencyEdge>) -> Vec<DependencyEdge> {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut unique: Vec<DependencyEdge> = Vec::with_capacity(edges.len());

    for edge in edges {
        let key = (
            edge.source.as_str().to_string(),
            edge.target.as_str().to_string(),
        );
        match positions.get(&key) {
            Some(&index) => {
                let kept = &mut unique[index];
                if edge.strength > kept.strength {
                    kept.strength = edge.strength;
                    kept.import = edge.import;
                }
            }
            None => {
                positions.insert(key, unique.len());
                unique.push(edge);
            }
        }
    }
    unique
}

/// Descending strength; equal strengths keep insertion order.
pub fn sort_by_strength(mut edges: Vec<DependencyEdge>) -> Vec<DependencyEdge> {
    edges.sort_by(|a, b| b.strength.cmp(&a.strength));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileRecord, ModuleId};
    use crate::engine::aggregate::FeatureAggregator;
    use crate::engine::modules::{classify_module, ModuleCandidate};
    use crate::languages::LanguageRegistry;
    use pretty_assertions::assert_eq;

    fn file(path: &str, imports: &[&str]) -> FileRecord {
        let mut record = FileRecord::new(path);
        record.imports = imports.iter().map(|s| s.to_string()).collect();
        record
    }

    fn module(root_path: &str, files: Vec<FileRecord>) -> Module {
        let name = root_path.rsplit('/').next().unwrap_or(root_path).to_string();
        let (module_type, responsibility) = classify_module(&name);
        let registry = LanguageRegistry::empty();
        FeatureAggregator::new(&registry).aggregate_module(ModuleCandidate {
            name,
            root_path: root_path.to_string(),
            module_type,
            responsibility,
            files,
        })
    }

    fn build(modules: &[Module]) -> GraphBuild {
        let scoring = ScoringConfig::default();
        DependencyGraphBuilder::new(modules, &scoring).build()
    }

    #[test]
    fn single_import_gives_base_strength_edge() {
        let modules = vec![
            module(
                "src/auth",
                vec![file("src/auth/login.ts", &["db"]), file("src/auth/session.ts", &[])],
            ),
            module(
                "src/db",
                vec![
                    file("src/db/a.ts", &[]),
                    file("src/db/b.ts", &[]),
                    file("src/db/c.ts", &[]),
                ],
            ),
        ];
        let result = build(&modules);

        assert_eq!(
            result.graph.edges,
            vec![DependencyEdge {
                source: ModuleId::from_root_path("src/auth"),
                target: ModuleId::from_root_path("src/db"),
                kind: EdgeKind::Import,
                import: "db".into(),
                strength: 1,
            }]
        );
        assert_eq!(result.unresolved_imports, 0);
    }

    #[test]
    fn duplicate_imports_collapse_to_one_edge() {
        let modules = vec![
            module(
                "src/auth",
                vec![
                    file("src/auth/login.ts", &["../db/client"]),
                    file("src/auth/session.ts", &["../db"]),
                ],
            ),
            module("src/db", vec![file("src/db/client.ts", &[])]),
        ];
        let result = build(&modules);

        assert_eq!(result.graph.edge_count(), 1);
        // both files reference db
        assert_eq!(result.graph.edges[0].strength, 2);
        assert_eq!(result.graph.edges[0].import, "../db/client");
    }

    #[test]
    fn wildcard_import_adds_bonus() {
        let modules = vec![
            module("src/api", vec![file("src/api/users.ts", &["../models/*"])]),
            module("src/models", vec![file("src/models/user.ts", &[])]),
        ];
        let result = build(&modules);
        assert_eq!(result.graph.edges[0].strength, 3);
    }

    #[test]
    fn self_and_external_imports_produce_no_edge() {
        let modules = vec![
            module(
                "src/auth",
                vec![
                    file("src/auth/login.ts", &["./session", "express", "auth"]),
                    file("src/auth/session.ts", &[]),
                ],
            ),
            module("src/db", vec![file("src/db/client.ts", &[])]),
        ];
        let result = build(&modules);

        assert!(result.graph.edges.is_empty());
        assert_eq!(result.unresolved_imports, 1);
    }

    #[test]
    fn sibling_file_import_stays_inside_module() {
        let modules = vec![
            module(
                "src/auth",
                vec![file("src/auth/login.ts", &["./utils"]), file("src/auth/utils.ts", &[])],
            ),
            module("src/utils", vec![file("src/utils/format.ts", &["../auth"])]),
        ];
        let result = build(&modules);

        let pairs: Vec<(&str, &str)> = result
            .graph
            .edges
            .iter()
            .map(|e| (e.import.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("../auth", ModuleId::from_root_path("src/auth").as_str())]);
        assert_eq!(result.unresolved_imports, 0);
    }

    #[test]
    fn relative_import_uses_the_importing_file_directory() {
        let modules = vec![
            module(
                "src/api",
                vec![
                    file("src/api/users.ts", &["../db/users"]),
                    file("src/api/v2/orders.ts", &["../../db/orders"]),
                ],
            ),
            module(
                "src/db",
                vec![file("src/db/users.ts", &[]), file("src/db/orders.ts", &[])],
            ),
            module("tools/db", vec![file("tools/db/seed.ts", &[])]),
        ];
        let result = build(&modules);

        assert_eq!(result.graph.edge_count(), 1);
        assert_eq!(result.graph.edges[0].target, ModuleId::from_root_path("src/db"));
        assert_eq!(result.graph.edges[0].strength, 2);
    }

    #[test]
    fn join_relative_normalizes_against_origin() {
        assert_eq!(
            join_relative("src/auth/login.ts", "../db/client.ts").as_deref(),
            Some("src/db/client")
        );
        assert_eq!(join_relative("src/auth/login.ts", "./utils").as_deref(), Some("src/auth/utils"));
        assert_eq!(join_relative("index.ts", "../outside"), None);
    }

    #[test]
    fn relative_import_resolves_through_file_paths() {
        let modules = vec![
            module("src/web", vec![file("src/web/app.ts", &["../shared/format/date"])]),
            module("src/utils", vec![file("src/utils/shared/format/date.ts", &[])]),
        ];
        let result = build(&modules);
        assert_eq!(result.graph.edge_count(), 1);
        assert_eq!(
            result.graph.edges[0].target,
            ModuleId::from_root_path("src/utils")
        );
    }

    #[test]
    fn most_specific_segment_wins() {
        let modules = vec![
            module("src/billing", vec![file("src/billing/invoice.ts", &[])]),
            module("src/services", vec![file("src/services/index.ts", &[])]),
            module("src/web", vec![file("src/web/app.ts", &["@app/services/billing"])]),
        ];
        let result = build(&modules);
        assert_eq!(
            result.graph.edges[0].target,
            ModuleId::from_root_path("src/billing")
        );
    }

    #[test]
    fn edges_sorted_by_strength_stably() {
        let make = |target: &str, strength| DependencyEdge {
            source: ModuleId::from_root_path("a"),
            target: ModuleId::from_root_path(target),
            kind: EdgeKind::Import,
            import: target.to_string(),
            strength,
        };
        let sorted = sort_by_strength(vec![make("b", 1), make("c", 3), make("d", 1), make("e", 3)]);
        let order: Vec<&str> = sorted.iter().map(|e| e.import.as_str()).collect();
        assert_eq!(order, vec!["c", "e", "b", "d"]);
    }

    #[test]
    fn single_module_has_no_edges() {
        let modules = vec![module("src/core", vec![file("src/core/a.rs", &["crate::core::b"])])];
        let result = build(&modules);
        assert_eq!(result.graph.edge_count(), 0);
    }
}
