//! Per-language text-pattern extraction.
//!
//! Each supported language implements [`LanguageAnalyzer`]. The scanner uses
//! [`LanguageAnalyzer::outline`] to turn file contents into a [`FileRecord`];
//! the engine uses [`LanguageAnalyzer::interfaces`] to measure each module's
//! public API surface. Analyzers are looked up through a [`LanguageRegistry`]
//! by file extension, so adding a language means registering a new analyzer.

use std::path::Path;

use crate::core::{FileRecord, FunctionInfo, ClassInfo, InterfaceInfo, InterfaceKind, Language};

pub mod ecmascript;
pub mod go;
pub mod python;
pub mod rust_lang;

pub use ecmascript::EcmaScriptAnalyzer;
pub use go::GoAnalyzer;
pub use python::PythonAnalyzer;
pub use rust_lang::RustAnalyzer;

/// Lightweight metadata extracted from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOutline {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

pub trait LanguageAnalyzer: Send + Sync {
    fn language(&self) -> Language;

    /// Lowercase file extensions handled by this analyzer, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    fn outline(&self, content: &str) -> SourceOutline;

    /// Public API surface of a file. The default treats every export as an
    /// interface, typed by the function or class it names.
    fn interfaces(&self, record: &FileRecord) -> Vec<InterfaceInfo> {
        exported_interfaces(record, &record.exports)
    }
}

/// Build interface entries for `names`, typed by matching functions/classes.
pub fn exported_interfaces(record: &FileRecord, names: &[String]) -> Vec<InterfaceInfo> {
    names
        .iter()
        .map(|name| InterfaceInfo {
            name: name.clone(),
            kind: interface_kind(record, name),
            file: record.path.clone(),
        })
        .collect()
}

fn interface_kind(record: &FileRecord, name: &str) -> InterfaceKind {
    if record.functions.iter().any(|f| f.name == name) {
        InterfaceKind::Function
    } else if record.classes.iter().any(|c| c.name == name) {
        InterfaceKind::Class
    } else {
        InterfaceKind::Export
    }
}

/// Split a raw parameter list into bare parameter names, dropping receivers.
pub(crate) fn parse_parameters(raw: &str, receivers: &[&str]) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| !receivers.contains(p))
        .filter_map(|p| {
            let name = p
                .trim_start_matches("...")
                .trim_start_matches('*')
                .trim_start_matches('&')
                .trim_start_matches("mut ")
                .split(|c: char| c == ':' || c == '=' || c.is_whitespace())
                .next()
                .unwrap_or_default()
                .trim();
            (!name.is_empty() && !receivers.contains(&name)).then(|| name.to_string())
        })
        .collect()
}

/// Push `value` unless already present, keeping first-seen order.
pub(crate) fn push_unique(values: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !values.contains(&value) {
        values.push(value);
    }
}

type AnalyzerFactory = fn() -> Box<dyn LanguageAnalyzer>;

static DEFAULT_ANALYZERS: &[AnalyzerFactory] = &[
    || Box::new(EcmaScriptAnalyzer::javascript()),
    || Box::new(EcmaScriptAnalyzer::typescript()),
    || Box::new(PythonAnalyzer::new()),
    || Box::new(RustAnalyzer::new()),
    || Box::new(GoAnalyzer::new()),
];

/// Extension-keyed lookup of language analyzers.
pub struct LanguageRegistry {
    analyzers: Vec<Box<dyn LanguageAnalyzer>>,
}

impl LanguageRegistry {
    pub fn empty() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self {
            analyzers: DEFAULT_ANALYZERS.iter().map(|factory| factory()).collect(),
        }
    }

    /// Later registrations take precedence for shared extensions.
    pub fn register(&mut self, analyzer: Box<dyn LanguageAnalyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn for_path(&self, path: &str) -> Option<&dyn LanguageAnalyzer> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        self.analyzers
            .iter()
            .rev()
            .find(|a| a.extensions().contains(&ext.as_str()))
            .map(|a| a.as_ref())
    }

    pub fn for_language(&self, language: Language) -> Option<&dyn LanguageAnalyzer> {
        self.analyzers
            .iter()
            .rev()
            .find(|a| a.language() == language)
            .map(|a| a.as_ref())
    }

    /// Interfaces of `record`, falling back to its export list when no
    /// analyzer handles the file.
    pub fn interfaces_for(&self, record: &FileRecord) -> Vec<InterfaceInfo> {
        match self.for_path(&record.path) {
            Some(analyzer) => analyzer.interfaces(record),
            None => exported_interfaces(record, &record.exports),
        }
    }

    pub fn languages(&self) -> Vec<Language> {
        self.analyzers.iter().map(|a| a.language()).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
