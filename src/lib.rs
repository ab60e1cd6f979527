// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod engine;
pub mod io;
pub mod languages;
pub mod scanner;

// Re-export commonly used types
pub use crate::core::{
    AnalysisInput, AnalysisResult, DependencyEdge, DependencyGraph, Error, FileRecord,
    IntegrationKind, IntegrationPoint, Language, LanguageSummary, Metrics, Module, ModuleId,
    ModuleType, Prerequisite, ProjectStructure, Result, Risk, RiskKind, Severity,
};

pub use crate::config::{load_config, ArchmapConfig};

pub use crate::engine::{analyze, Engine};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::languages::{LanguageAnalyzer, LanguageRegistry};

pub use crate::scanner::scan_project;
