//! Grouping of file records into logical modules.
//!
//! A module is the set of files sharing the first `modules.depth` directory
//! segments of their path, after looking through a leading source root such
//! as `src/`. Files directly under the project root form a `root` module.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::ArchmapConfig;
use crate::core::{FileRecord, ModuleType, ProjectStructure};

/// Root path and name used for files that live directly in the project root.
pub const ROOT_MODULE_PATH: &str = ".";
pub const ROOT_MODULE_NAME: &str = "root";

/// Files grouped under one module key, classified but not yet aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleCandidate {
    pub name: String,
    pub root_path: String,
    pub module_type: ModuleType,
    pub responsibility: String,
    pub files: Vec<FileRecord>,
}

struct ModuleRule {
    keywords: &'static [&'static str],
    module_type: ModuleType,
    responsibility: &'static str,
}

/// First matching rule wins, so more specific roles come first.
static MODULE_RULES: &[ModuleRule] = &[
    ModuleRule {
        keywords: &["test", "spec", "fixture"],
        module_type: ModuleType::Test,
        responsibility: "automated tests and fixtures",
    },
    ModuleRule {
        keywords: &["config", "setting", "conf"],
        module_type: ModuleType::Config,
        responsibility: "configuration and environment settings",
    },
    ModuleRule {
        keywords: &["auth", "security", "permission", "session"],
        module_type: ModuleType::Service,
        responsibility: "authentication and authorization",
    },
    ModuleRule {
        keywords: &["service", "api", "client", "gateway", "integration"],
        module_type: ModuleType::Service,
        responsibility: "service layer and external integrations",
    },
    ModuleRule {
        keywords: &[
            "model",
            "entity",
            "entities",
            "schema",
            "db",
            "database",
            "data",
            "repository",
            "store",
            "persistence",
            "migration",
        ],
        module_type: ModuleType::Model,
        responsibility: "data model and persistence",
    },
    ModuleRule {
        keywords: &[
            "view",
            "component",
            "page",
            "ui",
            "template",
            "screen",
            "layout",
            "widget",
        ],
        module_type: ModuleType::View,
        responsibility: "user interface rendering",
    },
    ModuleRule {
        keywords: &["controller", "route", "router", "handler", "endpoint"],
        module_type: ModuleType::Controller,
        responsibility: "request routing and handling",
    },
    ModuleRule {
        keywords: &["middleware", "interceptor", "guard", "filter", "plugin"],
        module_type: ModuleType::Middleware,
        responsibility: "request pipeline middleware",
    },
    ModuleRule {
        keywords: &["util", "helper", "lib", "common", "shared", "tool"],
        module_type: ModuleType::Utility,
        responsibility: "shared utilities and helpers",
    },
    ModuleRule {
        keywords: &["core", "kernel", "engine", "base", "foundation"],
        module_type: ModuleType::Core,
        responsibility: "core domain primitives and infrastructure",
    },
];

/// Keywords this short only match a whole name part (`db`, `ui`, `api`).
const SHORT_KEYWORD_LEN: usize = 3;

fn keyword_matches(name: &str, keyword: &str) -> bool {
    if keyword.len() <= SHORT_KEYWORD_LEN {
        name.split(['-', '_', '.', ' ']).any(|part| part == keyword)
    } else {
        name.contains(keyword)
    }
}

/// Module type and a one-line responsibility derived from the module name.
pub fn classify_module(name: &str) -> (ModuleType, String) {
    let lower = name.to_ascii_lowercase();
    MODULE_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| keyword_matches(&lower, k)))
        .map(|rule| (rule.module_type, rule.responsibility.to_string()))
        .unwrap_or_else(|| (ModuleType::Business, format!("business logic for {}", name)))
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ModuleKey {
    Directory { root_path: String, name: String },
    Root,
}

pub struct ModuleIdentifier<'a> {
    config: &'a ArchmapConfig,
}

impl<'a> ModuleIdentifier<'a> {
    pub fn new(config: &'a ArchmapConfig) -> Self {
        Self { config }
    }

    /// Group `files` into module candidates, ordered by root path with the
    /// root module last. Files under an ignored directory are dropped and
    /// directories without files never produce a module.
    pub fn identify(
        &self,
        files: &[FileRecord],
        structure: &ProjectStructure,
    ) -> Vec<ModuleCandidate> {
        let mut groups: BTreeMap<ModuleKey, Vec<FileRecord>> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in files {
            match self.key_for_segments(&record.directory_segments()) {
                Some(key) => groups.entry(key).or_default().push(record.clone()),
                None => skipped += 1,
            }
        }

        let empty_directories: BTreeSet<ModuleKey> = structure
            .directories
            .iter()
            .filter_map(|dir| self.key_for_segments(&directory_segments(dir)))
            .filter(|key| !groups.contains_key(key))
            .collect();

        debug!(
            modules = groups.len(),
            skipped_files = skipped,
            empty_directories = empty_directories.len(),
            "Grouped files into modules"
        );

        groups
            .into_iter()
            .map(|(key, files)| match key {
                ModuleKey::Directory { root_path, name } => {
                    let (module_type, responsibility) = classify_module(&name);
                    ModuleCandidate {
                        name,
                        root_path,
                        module_type,
                        responsibility,
                        files,
                    }
                }
                ModuleKey::Root => ModuleCandidate {
                    name: ROOT_MODULE_NAME.to_string(),
                    root_path: ROOT_MODULE_PATH.to_string(),
                    module_type: ModuleType::Root,
                    responsibility: "project entry points and top-level files".to_string(),
                    files,
                },
            })
            .collect()
    }

    fn key_for_segments(&self, segments: &[String]) -> Option<ModuleKey> {
        if segments.iter().any(|s| self.config.is_ignored_dir(s)) {
            return None;
        }
        if segments.is_empty() {
            return Some(ModuleKey::Root);
        }

        let start = if segments.len() > 1 && self.config.is_source_root(&segments[0]) {
            1
        } else {
            0
        };
        let end = (start + self.config.modules.depth.max(1)).min(segments.len());
        let name = segments[end - 1].clone();
        Some(ModuleKey::Directory {
            root_path: segments[..end].join("/"),
            name,
        })
    }
}

fn directory_segments(dir: &str) -> Vec<String> {
    crate::core::normalize_path(dir)
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect()
}
