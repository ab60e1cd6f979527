use once_cell::sync::Lazy;
use regex::Regex;

use super::{exported_interfaces, parse_parameters, push_unique, LanguageAnalyzer, SourceOutline};
use crate::core::{ClassInfo, FileRecord, FunctionInfo, InterfaceInfo, Language};

static IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*import\s+([\w.,\s]+?)\s*$").expect("valid regex"));
static FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\s+(.+)$").expect("valid regex"));
static DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:async\s+)?def\s+(\w+)\s*\(([^)]*)\)").expect("valid regex")
});
static CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)class\s+(\w+)").expect("valid regex"));
static SELF_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"self\.(\w+)\s*=[^=]").expect("valid regex"));
static DUNDER_ALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)__all__\s*=\s*[\[(](.*?)[\])]").expect("valid regex"));

const RECEIVERS: &[&str] = &["self", "cls"];

pub struct PythonAnalyzer;

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// `.db` becomes `./db`, `..core.models` becomes `../core/models`.
    fn relative_to_path(module: &str) -> String {
        let dots = module.chars().take_while(|c| *c == '.').count();
        let rest = module[dots..].replace('.', "/");
        let prefix = match dots {
            1 => "./".to_string(),
            n => "../".repeat(n - 1),
        };
        format!("{}{}", prefix, rest)
    }

    fn imports(content: &str) -> Vec<String> {
        let mut imports = Vec::new();
        for cap in IMPORT.captures_iter(content) {
            for name in cap[1].split(',') {
                let module = name.split_whitespace().next().unwrap_or_default();
                if !module.is_empty() {
                    push_unique(&mut imports, module);
                }
            }
        }
        for cap in FROM_IMPORT.captures_iter(content) {
            let module = &cap[1];
            let base = if module.starts_with('.') {
                Self::relative_to_path(module)
            } else {
                module.to_string()
            };
            if cap[2].trim() == "*" {
                let separator = if base.contains('/') || base.ends_with("./") { "" } else { "." };
                push_unique(&mut imports, format!("{}{}*", base, separator));
            } else {
                push_unique(&mut imports, base);
            }
        }
        imports
    }

    fn functions(content: &str) -> Vec<FunctionInfo> {
        DEF.captures_iter(content)
            .filter(|cap| cap[1].is_empty())
            .map(|cap| FunctionInfo {
                name: cap[2].to_string(),
                parameters: parse_parameters(&cap[3], RECEIVERS),
                visibility: None,
            })
            .collect()
    }

    fn classes(content: &str) -> Vec<ClassInfo> {
        let starts: Vec<(usize, usize, String)> = CLASS
            .captures_iter(content)
            .filter(|cap| cap[1].is_empty())
            .filter_map(|cap| cap.get(0).map(|m| (m.start(), m.end(), cap[2].to_string())))
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(i, (_, body_start, name))| {
                let end = Self::class_end(content, *body_start, starts.get(i + 1).map(|s| s.0));
                let body = &content[*body_start..end];
                let mut class = ClassInfo::new(name.clone());
                for cap in DEF.captures_iter(body).filter(|cap| !cap[1].is_empty()) {
                    push_unique(&mut class.methods, &cap[2]);
                }
                for cap in SELF_ATTRIBUTE.captures_iter(body) {
                    push_unique(&mut class.properties, &cap[1]);
                }
                class
            })
            .collect()
    }

    /// A top-level class body ends at the next unindented statement.
    fn class_end(content: &str, body_start: usize, next_class: Option<usize>) -> usize {
        let limit = next_class.unwrap_or(content.len());
        let mut offset = body_start;
        for (i, line) in content[body_start..limit].split_inclusive('\n').enumerate() {
            let starts_unindented = line
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && c != '#');
            if i > 0 && starts_unindented {
                return offset;
            }
            offset += line.len();
        }
        limit
    }

    fn exports(content: &str, functions: &[FunctionInfo], classes: &[ClassInfo]) -> Vec<String> {
        if let Some(cap) = DUNDER_ALL.captures(content) {
            return cap[1]
                .split(',')
                .map(|s| s.trim().trim_matches(|c| c == '"' || c == '\''))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        let mut exports = Vec::new();
        for name in functions
            .iter()
            .map(|f| &f.name)
            .chain(classes.iter().map(|c| &c.name))
        {
            if !name.starts_with('_') {
                push_unique(&mut exports, name.as_str());
            }
        }
        exports
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py", "pyi"]
    }

    fn outline(&self, content: &str) -> SourceOutline {
        let functions = Self::functions(content);
        let classes = Self::classes(content);
        let exports = Self::exports(content, &functions, &classes);
        SourceOutline {
            functions,
            classes,
            imports: Self::imports(content),
            exports,
        }
    }

    /// Without an export list, every public top-level name is part of the API.
    fn interfaces(&self, record: &FileRecord) -> Vec<InterfaceInfo> {
        if !record.exports.is_empty() {
            return exported_interfaces(record, &record.exports);
        }
        let public: Vec<String> = record
            .functions
            .iter()
            .map(|f| f.name.clone())
            .chain(record.classes.iter().map(|c| c.name.clone()))
            .filter(|name| !name.starts_with('_'))
            .collect();
        exported_interfaces(record, &public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InterfaceKind;
    use indoc::indoc;

    const SOURCE: &str = indoc! {r#"
        import os, sys
        from .db import session
        from ..core.models import *
        from services import billing

        class UserRepository:
            def __init__(self, session):
                self.session = session

            def find(self, user_id):
                return self.session.get(user_id)

        def load_user(user_id, repo=None):
            return repo.find(user_id)

        def _cache_key(user_id):
            return str(user_id)
    "#};

    #[test]
    fn relative_imports_become_paths() {
        let outline = PythonAnalyzer::new().outline(SOURCE);
        assert_eq!(
            outline.imports,
            vec!["os", "sys", "./db", "../core/models*", "services"]
        );
    }

    #[test]
    fn collects_top_level_functions_only() {
        let outline = PythonAnalyzer::new().outline(SOURCE);
        let names: Vec<&str> = outline.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["load_user", "_cache_key"]);
        assert_eq!(outline.functions[0].parameters, vec!["user_id", "repo"]);
    }

    #[test]
    fn collects_methods_and_attributes() {
        let outline = PythonAnalyzer::new().outline(SOURCE);
        assert_eq!(outline.classes.len(), 1);
        assert_eq!(outline.classes[0].methods, vec!["__init__", "find"]);
        assert_eq!(outline.classes[0].properties, vec!["session"]);
    }

    #[test]
    fn exports_are_public_names() {
        let outline = PythonAnalyzer::new().outline(SOURCE);
        assert_eq!(outline.exports, vec!["load_user", "UserRepository"]);
    }

    #[test]
    fn dunder_all_overrides_public_names() {
        let outline = PythonAnalyzer::new().outline("__all__ = ['a', \"b\"]\n\ndef a():\n    pass\n");
        assert_eq!(outline.exports, vec!["a", "b"]);
    }

    #[test]
    fn interfaces_fall_back_to_public_names() {
        let mut record = FileRecord::new("billing/api.py");
        record.functions = vec![FunctionInfo::new("charge"), FunctionInfo::new("_retry")];
        let interfaces = PythonAnalyzer::new().interfaces(&record);
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].kind, InterfaceKind::Function);
    }
}
