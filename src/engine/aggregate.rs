//! Roll-up of per-file metadata into module aggregates.

use rayon::prelude::*;
use tracing::debug;

use super::modules::ModuleCandidate;
use crate::core::{FileRecord, Module, ModuleClass, ModuleFunction, ModuleId, Visibility};
use crate::languages::LanguageRegistry;

/// Lowest complexity a non-empty module can report.
pub const MIN_MODULE_COMPLEXITY: u32 = 1;

pub struct FeatureAggregator<'a> {
    registry: &'a LanguageRegistry,
}

impl<'a> FeatureAggregator<'a> {
    pub fn new(registry: &'a LanguageRegistry) -> Self {
        Self { registry }
    }

    /// Aggregate every candidate. Output order matches input order.
    pub fn aggregate(&self, candidates: Vec<ModuleCandidate>) -> Vec<Module> {
        let modules: Vec<Module> = candidates
            .into_par_iter()
            .map(|candidate| self.aggregate_module(candidate))
            .collect();
        debug!(modules = modules.len(), "Aggregated module features");
        modules
    }

    pub fn aggregate_module(&self, candidate: ModuleCandidate) -> Module {
        let files = candidate.files;

        let functions = files
            .iter()
            .flat_map(|file| {
                file.functions.iter().map(|function| ModuleFunction {
                    name: function.name.clone(),
                    file: file.path.clone(),
                    parameters: function.parameters.clone(),
                    visibility: function
                        .visibility
                        .unwrap_or_else(|| Visibility::infer(&function.name)),
                })
            })
            .collect();

        let classes = files
            .iter()
            .flat_map(|file| {
                file.classes.iter().map(|class| ModuleClass {
                    name: class.name.clone(),
                    file: file.path.clone(),
                    methods: class.methods.clone(),
                    properties: class.properties.clone(),
                })
            })
            .collect();

        let interfaces = files
            .iter()
            .flat_map(|file| self.registry.interfaces_for(file))
            .collect();

        Module {
            id: ModuleId::from_root_path(&candidate.root_path),
            name: candidate.name,
            root_path: candidate.root_path,
            module_type: candidate.module_type,
            responsibility: candidate.responsibility,
            functions,
            classes,
            exports: unique_strings(files.iter().flat_map(|f| f.exports.iter())),
            imports: unique_strings(files.iter().flat_map(|f| f.imports.iter())),
            interfaces,
            complexity: module_complexity(&files),
            test_coverage: estimate_test_coverage(&files),
            has_documentation: files.iter().any(FileRecord::is_documentation),
            files,
        }
    }
}

/// First-seen order, duplicates dropped.
fn unique_strings<'s>(values: impl Iterator<Item = &'s String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        if !unique.contains(value) {
            unique.push(value.clone());
        }
    }
    unique
}

pub fn module_complexity(files: &[FileRecord]) -> u32 {
    files
        .iter()
        .map(FileRecord::estimated_complexity)
        .fold(0u32, u32::saturating_add)
        .max(MIN_MODULE_COMPLEXITY)
}

/// Test files per ordinary source file as a rounded percentage, capped at 100.
/// A module without source files reports 0.
pub fn estimate_test_coverage(files: &[FileRecord]) -> f64 {
    let source = files.iter().filter(|f| f.is_source()).count();
    if source == 0 {
        return 0.0;
    }
    let tests = files.iter().filter(|f| f.is_test()).count();
    ((tests as f64 / source as f64) * 100.0).round().min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileCategory, FunctionInfo, ModuleType};

    fn candidate(files: Vec<FileRecord>) -> ModuleCandidate {
        ModuleCandidate {
            name: "auth".into(),
            root_path: "src/auth".into(),
            module_type: ModuleType::Service,
            responsibility: "authentication and authorization".into(),
            files,
        }
    }

    fn aggregate(files: Vec<FileRecord>) -> Module {
        let registry = LanguageRegistry::with_defaults();
        FeatureAggregator::new(&registry).aggregate_module(candidate(files))
    }

    #[test]
    fn imports_are_deduplicated_in_order() {
        let mut a = FileRecord::new("src/auth/login.ts");
        a.imports = vec!["../db".into(), "express".into()];
        let mut b = FileRecord::new("src/auth/session.ts");
        b.imports = vec!["express".into(), "../cache".into()];

        let module = aggregate(vec![a, b]);
        assert_eq!(module.imports, vec!["../db", "express", "../cache"]);
    }

    #[test]
    fn visibility_inferred_only_when_missing() {
        let mut file = FileRecord::new("src/auth/login.ts");
        let mut explicit = FunctionInfo::new("_legacy");
        explicit.visibility = Some(Visibility::Public);
        file.functions = vec![
            FunctionInfo::new("_hash"),
            FunctionInfo::new("testLogin"),
            FunctionInfo::new("login"),
            explicit,
        ];

        let module = aggregate(vec![file]);
        let visibilities: Vec<Visibility> = module.functions.iter().map(|f| f.visibility).collect();
        assert_eq!(
            visibilities,
            vec![
                Visibility::Private,
                Visibility::Test,
                Visibility::Public,
                Visibility::Public
            ]
        );
        assert!(module.functions.iter().all(|f| f.file == "src/auth/login.ts"));
    }

    #[test]
    fn complexity_sums_files_and_never_reaches_zero() {
        let mut a = FileRecord::new("src/auth/a.ts");
        a.complexity = Some(4);
        let mut b = FileRecord::new("src/auth/b.ts");
        b.line_count = 120;
        assert_eq!(module_complexity(&[a, b]), 7);

        let empty = FileRecord::new("src/auth/empty.ts");
        assert_eq!(module_complexity(&[empty]), 1);
    }

    #[test]
    fn complexity_saturates_on_huge_file_values() {
        let mut a = FileRecord::new("src/auth/a.ts");
        a.complexity = Some(u32::MAX);
        let mut b = FileRecord::new("src/auth/b.ts");
        b.complexity = Some(10);
        assert_eq!(module_complexity(&[a, b]), u32::MAX);
    }

    #[test]
    fn coverage_is_zero_without_source_files() {
        let test_only = FileRecord::new("src/auth/login.test.ts");
        assert_eq!(estimate_test_coverage(&[test_only]), 0.0);
        assert_eq!(estimate_test_coverage(&[]), 0.0);
    }

    #[test]
    fn coverage_is_rounded_percentage() {
        let files = vec![
            FileRecord::new("src/auth/a.ts"),
            FileRecord::new("src/auth/b.ts"),
            FileRecord::new("src/auth/c.ts"),
            FileRecord::new("src/auth/a.test.ts"),
        ];
        assert_eq!(estimate_test_coverage(&files), 33.0);

        let mut doc = FileRecord::new("src/auth/notes.txt");
        doc.category = Some(FileCategory::Documentation);
        let module = aggregate(vec![FileRecord::new("src/auth/a.ts"), doc]);
        assert!(module.has_documentation);
    }

    #[test]
    fn interfaces_come_from_the_registry() {
        let mut file = FileRecord::new("src/auth/login.ts");
        file.functions = vec![FunctionInfo::new("login")];
        file.exports = vec!["login".into()];
        let module = aggregate(vec![file]);
        assert_eq!(module.interfaces.len(), 1);
        assert_eq!(module.interfaces[0].name, "login");
    }
}
