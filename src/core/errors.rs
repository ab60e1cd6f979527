//! Shared error types for the application

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Input data sets the engine needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prerequisite {
    /// Directory listing of the project
    ProjectStructure,
    /// Primary-language detection result
    PrimaryLanguage,
    /// Per-file analysis records
    FileAnalysis,
}

impl Prerequisite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectStructure => "project structure",
            Self::PrimaryLanguage => "primary language",
            Self::FileAnalysis => "file analysis",
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for archmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required input data set is absent; the pipeline does not run
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(Prerequisite),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failures while walking or reading the project tree
    #[error("Scan error at {}: {message}", path.display())]
    Scan { message: String, path: PathBuf },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Create a scan error with path context
    pub fn scan(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Scan {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }

    /// The missing input set, when this error aborted the pipeline for one
    pub fn missing_prerequisite(&self) -> Option<Prerequisite> {
        match self {
            Self::MissingPrerequisite(p) => Some(*p),
            _ => None,
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prerequisite_names_the_input_set() {
        let err = Error::MissingPrerequisite(Prerequisite::FileAnalysis);
        assert_eq!(err.to_string(), "missing prerequisite: file analysis");
        assert_eq!(err.missing_prerequisite(), Some(Prerequisite::FileAnalysis));
    }

    #[test]
    fn context_wraps_message() {
        let result: Result<()> = Err(Error::Configuration("depth must be at least 1".into()));
        let err = result.context("loading .archmap.toml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "loading .archmap.toml: Configuration error: depth must be at least 1"
        );
        assert!(err.missing_prerequisite().is_none());
    }
}
