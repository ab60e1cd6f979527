//! Data model shared by the scanner, the engine and the writers.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh64::xxh64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Rust,
    Go,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "py" | "pyi" => Language::Python,
            "rs" => Language::Rust,
            "go" => Language::Go,
            _ => Language::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    #[default]
    Source,
    Test,
    Config,
    Documentation,
    Other,
}

impl FileCategory {
    /// Classify a file from its path alone.
    pub fn infer(path: &str) -> Self {
        if path_marks_test(path) {
            return FileCategory::Test;
        }
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "md" | "markdown" | "rst" | "txt" | "adoc" => FileCategory::Documentation,
            "toml" | "json" | "yaml" | "yml" | "ini" | "env" | "cfg" => FileCategory::Config,
            _ if Language::from_extension(&ext) != Language::Unknown => FileCategory::Source,
            _ => FileCategory::Other,
        }
    }
}

const TEST_DIRECTORIES: &[&str] = &["test", "tests", "spec", "specs", "__tests__", "__test__"];

/// True when a directory segment or the file name marks the path as a test.
pub fn path_marks_test(path: &str) -> bool {
    let normalized = normalize_path(path);
    let mut segments: Vec<&str> = normalized.split('/').collect();
    let file_name = segments.pop().unwrap_or_default().to_ascii_lowercase();

    if segments
        .iter()
        .any(|s| TEST_DIRECTORIES.contains(&s.to_ascii_lowercase().as_str()))
    {
        return true;
    }

    let stem = file_name.split('.').next().unwrap_or_default();
    stem.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with("_spec")
        || file_name.contains(".test.")
        || file_name.contains(".spec.")
}

/// Forward slashes, no leading `./`, no trailing `/`.
pub fn normalize_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut trimmed = replaced.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Test,
}

impl Visibility {
    /// Naming-convention visibility: `_x`/`#x` private, names mentioning
    /// "test" test-only, everything else public.
    pub fn infer(name: &str) -> Self {
        if name.starts_with('_') || name.starts_with('#') {
            Visibility::Private
        } else if name.to_ascii_lowercase().contains("test") {
            Visibility::Test
        } else {
            Visibility::Public
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl FunctionInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            visibility: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub properties: Vec<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// Per-file analysis produced by the upstream scanner.
///
/// Every field except `path` is optional on the wire; absent fields fall back
/// to empty collections and a line-count based complexity estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub category: Option<FileCategory>,
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub line_count: usize,
    #[serde(default)]
    pub complexity: Option<u32>,
}

/// Lines per complexity point when no score was supplied.
pub const LINES_PER_COMPLEXITY_POINT: usize = 50;

impl FileRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            category: None,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            line_count: 0,
            complexity: None,
        }
    }

    pub fn category(&self) -> FileCategory {
        self.category
            .unwrap_or_else(|| FileCategory::infer(&self.path))
    }

    pub fn is_test(&self) -> bool {
        self.category() == FileCategory::Test || path_marks_test(&self.path)
    }

    pub fn is_source(&self) -> bool {
        self.category() == FileCategory::Source && !self.is_test()
    }

    pub fn is_documentation(&self) -> bool {
        if self.category() == FileCategory::Documentation {
            return true;
        }
        let lower = self.path.to_ascii_lowercase();
        lower.ends_with(".md") || lower.rsplit('/').next().is_some_and(|f| f.starts_with("readme"))
    }

    /// Supplied complexity, else `ceil(line_count / 50)`.
    pub fn estimated_complexity(&self) -> u32 {
        self.complexity
            .unwrap_or_else(|| self.line_count.div_ceil(LINES_PER_COMPLEXITY_POINT) as u32)
    }

    pub fn language(&self) -> Language {
        Language::from_path(Path::new(&self.path))
    }

    /// Directory segments of the normalized path, file name excluded.
    pub fn directory_segments(&self) -> Vec<String> {
        let normalized = normalize_path(&self.path);
        let mut segments: Vec<String> = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        segments.pop();
        segments
    }
}

/// Stable module identity derived from the module's root path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn from_root_path(root_path: &str) -> Self {
        let canonical = normalize_path(root_path);
        ModuleId(format!("mod_{:016x}", xxh64(canonical.as_bytes(), 0)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Core,
    Service,
    Utility,
    Model,
    View,
    Controller,
    Middleware,
    Test,
    Config,
    Business,
    Root,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Core => "core",
            ModuleType::Service => "service",
            ModuleType::Utility => "utility",
            ModuleType::Model => "model",
            ModuleType::View => "view",
            ModuleType::Controller => "controller",
            ModuleType::Middleware => "middleware",
            ModuleType::Test => "test",
            ModuleType::Config => "config",
            ModuleType::Business => "business",
            ModuleType::Root => "root",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleFunction {
    pub name: String,
    pub file: String,
    pub parameters: Vec<String>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleClass {
    pub name: String,
    pub file: String,
    pub methods: Vec<String>,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Function,
    Class,
    Export,
}

/// One item of a module's public API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub kind: InterfaceKind,
    pub file: String,
}

/// A logical group of files analyzed as one unit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub root_path: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    #[serde(serialize_with = "serialize_file_paths")]
    pub files: Vec<FileRecord>,
    pub functions: Vec<ModuleFunction>,
    pub classes: Vec<ModuleClass>,
    pub exports: Vec<String>,
    pub imports: Vec<String>,
    pub interfaces: Vec<InterfaceInfo>,
    pub responsibility: String,
    pub complexity: u32,
    pub test_coverage: f64,
    pub has_documentation: bool,
}

impl Module {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn serialize_file_paths<S: Serializer>(files: &[FileRecord], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(files.iter().map(|f| f.path.as_str()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: ModuleId,
    pub target: ModuleId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub import: String,
    pub strength: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: ModuleId,
    pub name: String,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
}

/// Directed module graph. Node `i` is module `i` of the run's module list;
/// `adjacency` holds node indices and is rebuilt from `edges`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<DependencyEdge>,
    #[serde(skip)]
    adjacency: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Panics in debug builds if an edge references an unknown node.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<DependencyEdge>) -> Self {
        let index: BTreeMap<&ModuleId, usize> =
            nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();
        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in &edges {
            match (index.get(&edge.source), index.get(&edge.target)) {
                (Some(&s), Some(&t)) => adjacency[s].push(t),
                _ => debug_assert!(false, "edge {} -> {} has a dangling end", edge.source, edge.target),
            }
        }
        Self {
            nodes,
            edges,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn index_of(&self, id: &ModuleId) -> Option<usize> {
        self.nodes.iter().position(|n| &n.id == id)
    }

    pub fn successors(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fan_out(&self, node: usize) -> usize {
        self.successors(node).len()
    }

    pub fn fan_in(&self, node: usize) -> usize {
        self.adjacency
            .iter()
            .filter(|targets| targets.contains(&node))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationKind {
    ServiceIntegration,
    DataAccess,
    RequestHandling,
    Presentation,
    CrossCutting,
    Configuration,
    ModuleIntegration,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::ServiceIntegration => "service-integration",
            IntegrationKind::DataAccess => "data-access",
            IntegrationKind::RequestHandling => "request-handling",
            IntegrationKind::Presentation => "presentation",
            IntegrationKind::CrossCutting => "cross-cutting",
            IntegrationKind::Configuration => "configuration",
            IntegrationKind::ModuleIntegration => "module-integration",
        }
    }

    /// Every kind except plain module-to-module use crosses a layer boundary.
    pub fn crosses_boundary(&self) -> bool {
        !matches!(self, IntegrationKind::ModuleIntegration)
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPoint {
    pub id: String,
    pub source: ModuleId,
    pub target: ModuleId,
    pub source_name: String,
    pub target_name: String,
    pub kind: IntegrationKind,
    pub import: String,
    pub strength: u32,
    pub complexity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetrics {
    pub module_id: ModuleId,
    pub name: String,
    pub cohesion: f64,
    pub fan_in: usize,
    pub fan_out: usize,
    pub instability: f64,
}

/// Analysis-level structural metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_modules: usize,
    pub total_relations: usize,
    pub cohesion: f64,
    pub coupling: f64,
    pub maintainability_index: f64,
    pub quality_score: f64,
    pub complexity_score: f64,
    pub avg_complexity: f64,
    pub avg_test_coverage: f64,
    pub interface_count: usize,
    pub documentation_coverage: f64,
    pub unresolved_imports: usize,
    pub modules: Vec<ModuleMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    CircularDependency,
    HighCoupling,
    UntestedModule,
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskKind::CircularDependency => "circular_dependency",
            RiskKind::HighCoupling => "high_coupling",
            RiskKind::UntestedModule => "untested_module",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Risk {
    #[serde(rename = "type")]
    pub kind: RiskKind,
    pub modules: Vec<ModuleId>,
    pub path: Vec<String>,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStructure {
    pub directories: Vec<String>,
    #[serde(default)]
    pub total_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSummary {
    pub primary: Language,
    #[serde(default)]
    pub counts: BTreeMap<Language, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArchitectureSummary {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Snapshot handed to the engine. `architecture` is the only optional set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub project_root: PathBuf,
    #[serde(default)]
    pub structure: Option<ProjectStructure>,
    #[serde(default)]
    pub language: Option<LanguageSummary>,
    #[serde(default)]
    pub files: Option<Vec<FileRecord>>,
    #[serde(default)]
    pub architecture: Option<ArchitectureSummary>,
}

impl AnalysisInput {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            structure: None,
            language: None,
            files: None,
            architecture: None,
        }
    }

    pub fn with_structure(mut self, structure: ProjectStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn with_language(mut self, language: LanguageSummary) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_files(mut self, files: Vec<FileRecord>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_architecture(mut self, architecture: ArchitectureSummary) -> Self {
        self.architecture = Some(architecture);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub modules: Vec<Module>,
    pub dependencies: DependencyGraph,
    pub integration_points: Vec<IntegrationPoint>,
    pub metrics: Metrics,
    pub risks: Vec<Risk>,
    pub recommendations: Vec<String>,
    pub contract_document: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_is_stable_for_equivalent_paths() {
        let a = ModuleId::from_root_path("src/auth");
        let b = ModuleId::from_root_path("./src/auth/");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("mod_"));
        assert_ne!(a, ModuleId::from_root_path("src/db"));
    }

    #[test]
    fn visibility_follows_naming_convention() {
        assert_eq!(Visibility::infer("_helper"), Visibility::Private);
        assert_eq!(Visibility::infer("#secret"), Visibility::Private);
        assert_eq!(Visibility::infer("testLogin"), Visibility::Test);
        assert_eq!(Visibility::infer("login"), Visibility::Public);
    }

    #[test]
    fn complexity_falls_back_to_line_estimate() {
        let mut record = FileRecord::new("src/a.ts");
        record.line_count = 101;
        assert_eq!(record.estimated_complexity(), 3);
        record.complexity = Some(7);
        assert_eq!(record.estimated_complexity(), 7);
    }

    #[test]
    fn category_inferred_when_missing() {
        assert_eq!(FileCategory::infer("src/auth/login.test.ts"), FileCategory::Test);
        assert_eq!(FileCategory::infer("tests/helpers.py"), FileCategory::Test);
        assert_eq!(FileCategory::infer("docs/README.md"), FileCategory::Documentation);
        assert_eq!(FileCategory::infer("config/app.yaml"), FileCategory::Config);
        assert_eq!(FileCategory::infer("src/lib.rs"), FileCategory::Source);
        assert_eq!(FileCategory::infer("assets/logo.png"), FileCategory::Other);
    }

    #[test]
    fn malformed_record_gets_safe_defaults() {
        let record: FileRecord = serde_json::from_str(r#"{"path": "lib/x.js"}"#).unwrap();
        assert!(record.functions.is_empty());
        assert!(record.imports.is_empty());
        assert_eq!(record.line_count, 0);
        assert_eq!(record.estimated_complexity(), 0);
        assert_eq!(record.category(), FileCategory::Source);
    }

    #[test]
    fn directory_segments_drop_file_name() {
        let record = FileRecord::new("./src\\auth/login.ts");
        assert_eq!(record.directory_segments(), vec!["src", "auth"]);
        assert!(FileRecord::new("main.go").directory_segments().is_empty());
    }
}
