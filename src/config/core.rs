use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Root configuration structure for archmap
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ArchmapConfig {
    /// Module grouping rules
    #[serde(default)]
    pub modules: ModulesConfig,

    /// Dependency strength heuristics
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Integration point promotion and ranking
    #[serde(default)]
    pub integration: IntegrationConfig,

    /// Structural risk thresholds
    #[serde(default)]
    pub risks: RiskConfig,

    /// Limits that trigger report recommendations
    #[serde(default)]
    pub recommendations: RecommendationConfig,
}

impl ArchmapConfig {
    pub fn validate(&self) -> Result<()> {
        let problems: Vec<String> = self
            .collect_validations()
            .into_iter()
            .filter_map(|r| r.err())
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Configuration(problems.join("; ")))
        }
    }

    fn collect_validations(&self) -> Vec<std::result::Result<(), String>> {
        vec![
            check(self.modules.depth >= 1, "modules.depth must be at least 1"),
            check(
                self.integration.complexity_divisor > 0.0,
                "integration.complexity_divisor must be positive",
            ),
            check(
                self.integration.strength_weight >= 0.0,
                "integration.strength_weight must not be negative",
            ),
            check(
                (0.0..=100.0).contains(&self.recommendations.min_test_coverage),
                "recommendations.min_test_coverage must be between 0 and 100",
            ),
            check(
                (0.0..=1.0).contains(&self.recommendations.max_coupling),
                "recommendations.max_coupling must be between 0.0 and 1.0",
            ),
            check(
                (0.0..=1.0).contains(&self.recommendations.min_cohesion),
                "recommendations.min_cohesion must be between 0.0 and 1.0",
            ),
            check(
                !self.scoring.wildcard_marker.is_empty(),
                "scoring.wildcard_marker must not be empty",
            ),
        ]
    }

    /// True when `segment` names a directory that never becomes a module.
    pub fn is_ignored_dir(&self, segment: &str) -> bool {
        self.modules
            .ignore_dirs
            .iter()
            .any(|d| d.eq_ignore_ascii_case(segment))
    }

    pub fn is_source_root(&self, segment: &str) -> bool {
        self.modules
            .source_roots
            .iter()
            .any(|d| d.eq_ignore_ascii_case(segment))
    }
}

fn check(ok: bool, message: &str) -> std::result::Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModulesConfig {
    /// Number of directory levels (below a source root) that form a module
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Directory names skipped entirely, compared case-insensitively
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Leading directories looked through when grouping (`src/auth` groups as `auth`)
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            ignore_dirs: default_ignore_dirs(),
            source_roots: default_source_roots(),
        }
    }
}

fn default_depth() -> usize {
    1
}

fn default_ignore_dirs() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "dist",
        "build",
        "coverage",
        "__pycache__",
        "target",
        "bin",
        "obj",
        ".next",
        ".venv",
        "venv",
        "vendor",
        ".idea",
        ".vscode",
        ".pytest_cache",
        ".mypy_cache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_source_roots() -> Vec<String> {
    ["src", "lib", "app", "packages"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Weights applied when scoring a dependency edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    /// Strength of a single resolved import
    #[serde(default = "default_base_strength")]
    pub base_strength: u32,

    /// Added when the import string contains `wildcard_marker`
    #[serde(default = "default_wildcard_bonus")]
    pub wildcard_bonus: u32,

    /// Added when more than one source file references the target module
    #[serde(default = "default_multi_file_bonus")]
    pub multi_file_bonus: u32,

    #[serde(default = "default_wildcard_marker")]
    pub wildcard_marker: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_strength: default_base_strength(),
            wildcard_bonus: default_wildcard_bonus(),
            multi_file_bonus: default_multi_file_bonus(),
            wildcard_marker: default_wildcard_marker(),
        }
    }
}

fn default_base_strength() -> u32 {
    1
}
fn default_wildcard_bonus() -> u32 {
    2
}
fn default_multi_file_bonus() -> u32 {
    1
}
fn default_wildcard_marker() -> String {
    "*".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrationConfig {
    /// Edges at or above this strength are promoted regardless of role
    #[serde(default = "default_strong_strength")]
    pub strong_strength: u32,

    /// Complexity contributed by each point of edge strength
    #[serde(default = "default_strength_weight")]
    pub strength_weight: f64,

    /// Divides the summed complexity of both modules
    #[serde(default = "default_complexity_divisor")]
    pub complexity_divisor: f64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            strong_strength: default_strong_strength(),
            strength_weight: default_strength_weight(),
            complexity_divisor: default_complexity_divisor(),
        }
    }
}

fn default_strong_strength() -> u32 {
    2
}
fn default_strength_weight() -> f64 {
    2.0
}
fn default_complexity_divisor() -> f64 {
    10.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskConfig {
    /// Fan-in plus fan-out at which a module is flagged as a coupling hub
    #[serde(default = "default_hub_threshold")]
    pub hub_threshold: usize,

    /// Complexity at which a module without tests is flagged
    #[serde(default = "default_untested_complexity")]
    pub untested_complexity: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            hub_threshold: default_hub_threshold(),
            untested_complexity: default_untested_complexity(),
        }
    }
}

fn default_hub_threshold() -> usize {
    6
}
fn default_untested_complexity() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationConfig {
    #[serde(default = "default_max_complexity")]
    pub max_complexity: f64,

    /// Percentage, 0-100
    #[serde(default = "default_min_test_coverage")]
    pub min_test_coverage: f64,

    #[serde(default = "default_max_coupling")]
    pub max_coupling: f64,

    #[serde(default = "default_min_cohesion")]
    pub min_cohesion: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            max_complexity: default_max_complexity(),
            min_test_coverage: default_min_test_coverage(),
            max_coupling: default_max_coupling(),
            min_cohesion: default_min_cohesion(),
        }
    }
}

fn default_max_complexity() -> f64 {
    8.0
}
fn default_min_test_coverage() -> f64 {
    70.0
}
fn default_max_coupling() -> f64 {
    0.5
}
fn default_min_cohesion() -> f64 {
    0.3
}
