use once_cell::sync::Lazy;
use regex::Regex;

use super::{exported_interfaces, parse_parameters, push_unique, LanguageAnalyzer, SourceOutline};
use crate::core::{ClassInfo, FileRecord, FunctionInfo, InterfaceInfo, Language, Visibility};

static IMPORT_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^import\s+(\.|_|\w+)?\s*"([^"]+)""#).expect("valid regex")
});
static IMPORT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)import\s*\((.*?)\)").expect("valid regex"));
static IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*(\.|_|\w+)?\s*"([^"]+)""#).expect("valid regex"));
static FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^func\s+(?:\(\s*\w*\s*\*?(\w+)\s*\)\s*)?(\w+)\s*(?:\[[^\]]*\])?\s*\(([^)]*)\)")
        .expect("valid regex")
});
static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^type\s+(\w+)\s+(struct|interface)\s*\{").expect("valid regex")
});
static FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s+(\w+)\s+\S").expect("valid regex"));

pub struct GoAnalyzer;

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

impl GoAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Dot-imports merge the whole package namespace, recorded with a `/*` marker.
    fn import_entry(alias: Option<&str>, path: &str) -> String {
        if alias == Some(".") {
            format!("{}/*", path)
        } else {
            path.to_string()
        }
    }

    fn imports(content: &str) -> Vec<String> {
        let mut imports = Vec::new();
        for cap in IMPORT_SINGLE.captures_iter(content) {
            let alias = cap.get(1).map(|m| m.as_str());
            push_unique(&mut imports, Self::import_entry(alias, &cap[2]));
        }
        for block in IMPORT_BLOCK.captures_iter(content) {
            for cap in IMPORT_LINE.captures_iter(&block[1]) {
                let alias = cap.get(1).map(|m| m.as_str());
                push_unique(&mut imports, Self::import_entry(alias, &cap[2]));
            }
        }
        imports
    }

    fn functions(content: &str) -> Vec<FunctionInfo> {
        FUNC.captures_iter(content)
            .filter(|cap| cap.get(1).is_none())
            .map(|cap| FunctionInfo {
                name: cap[2].to_string(),
                parameters: parse_parameters(&cap[3], &[]),
                visibility: Some(if is_exported(&cap[2]) {
                    Visibility::Public
                } else {
                    Visibility::Private
                }),
            })
            .collect()
    }

    fn classes(content: &str) -> Vec<ClassInfo> {
        let mut classes: Vec<ClassInfo> = TYPE_DECL
            .captures_iter(content)
            .map(|cap| {
                let mut class = ClassInfo::new(&cap[1]);
                let body_start = cap.get(0).map(|m| m.end()).unwrap_or(content.len());
                let body_end = content[body_start..]
                    .find("\n}")
                    .map(|i| body_start + i)
                    .unwrap_or(content.len());
                let body = &content[body_start..body_end];
                for field in FIELD.captures_iter(body) {
                    if &cap[2] == "interface" {
                        continue;
                    }
                    push_unique(&mut class.properties, &field[1]);
                }
                class
            })
            .collect();

        for cap in FUNC.captures_iter(content) {
            let Some(receiver) = cap.get(1) else {
                continue;
            };
            if let Some(class) = classes.iter_mut().find(|c| c.name == receiver.as_str()) {
                push_unique(&mut class.methods, &cap[2]);
            }
        }
        classes
    }
}

impl Default for GoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for GoAnalyzer {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn outline(&self, content: &str) -> SourceOutline {
        let functions = Self::functions(content);
        let classes = Self::classes(content);
        let mut exports = Vec::new();
        for name in functions
            .iter()
            .map(|f| f.name.as_str())
            .chain(classes.iter().map(|c| c.name.as_str()))
            .filter(|name| is_exported(name))
        {
            push_unique(&mut exports, name);
        }
        SourceOutline {
            functions,
            classes,
            imports: Self::imports(content),
            exports,
        }
    }

    /// Capitalized identifiers are the package API.
    fn interfaces(&self, record: &FileRecord) -> Vec<InterfaceInfo> {
        if !record.exports.is_empty() {
            return exported_interfaces(record, &record.exports);
        }
        let exported: Vec<String> = record
            .functions
            .iter()
            .map(|f| f.name.clone())
            .chain(record.classes.iter().map(|c| c.name.clone()))
            .filter(|name| is_exported(name))
            .collect();
        exported_interfaces(record, &exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SOURCE: &str = indoc! {r#"
        package store

        import "fmt"

        import (
            "database/sql"
            . "example.com/app/models"
            log "example.com/app/logging"
        )

        type Store struct {
            DB    *sql.DB
            cache map[string]string
        }

        type Reader interface {
            Read(id string) error
        }

        func (s *Store) Get(id string) string {
            return s.cache[id]
        }

        func NewStore(db *sql.DB, size int) *Store {
            fmt.Println(size)
            return &Store{DB: db}
        }

        func helper() {}
    "#};

    #[test]
    fn collects_single_and_block_imports() {
        let outline = GoAnalyzer::new().outline(SOURCE);
        assert_eq!(
            outline.imports,
            vec![
                "fmt",
                "database/sql",
                "example.com/app/models/*",
                "example.com/app/logging"
            ]
        );
    }

    #[test]
    fn methods_attach_to_receiver_type() {
        let outline = GoAnalyzer::new().outline(SOURCE);
        let store = outline.classes.iter().find(|c| c.name == "Store").unwrap();
        assert_eq!(store.methods, vec!["Get"]);
        assert_eq!(store.properties, vec!["DB", "cache"]);
        let names: Vec<&str> = outline.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["NewStore", "helper"]);
    }

    #[test]
    fn capitalized_names_are_exported() {
        let outline = GoAnalyzer::new().outline(SOURCE);
        assert_eq!(outline.exports, vec!["NewStore", "Store", "Reader"]);
    }
}
