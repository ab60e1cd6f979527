use once_cell::sync::Lazy;
use regex::Regex;

use super::{exported_interfaces, parse_parameters, push_unique, LanguageAnalyzer, SourceOutline};
use crate::core::{ClassInfo, FileRecord, FunctionInfo, InterfaceInfo, Language, Visibility};

static USE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+((?:\w+::)*(?:\w+|\*))").expect("valid regex")
});
static FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+\S+\s+)?fn\s+(\w+)\s*(?:<[^>]*>)?\s*\(([^)]*)\)")
        .expect("valid regex")
});
static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(pub(?:\([^)]*\))?\s+)?(struct|enum|trait|union)\s+(\w+)")
        .expect("valid regex")
});
static STRUCT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s+(?:pub(?:\([^)]*\))?\s+)?(\w+)\s*:\s*[^:]").expect("valid regex")
});
static IMPL_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^impl(?:<[^>]*>)?\s+(?:[\w:<>, ]+\s+for\s+)?(\w+)").expect("valid regex")
});
static PUB_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^pub\s+(?:const\s+fn|async\s+fn|unsafe\s+fn|fn|struct|enum|trait|type|const|static|mod|union)\s+(\w+)")
        .expect("valid regex")
});

/// Standard-library paths never name a project module.
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];

const RECEIVERS: &[&str] = &["self", "&self", "&mut self", "mut self"];

pub struct RustAnalyzer;

impl RustAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn imports(content: &str) -> Vec<String> {
        let mut imports = Vec::new();
        for cap in USE.captures_iter(content) {
            let path = cap[1].trim_end_matches("::");
            let root = path.split("::").next().unwrap_or_default();
            if !STD_ROOTS.contains(&root) && !path.is_empty() {
                push_unique(&mut imports, path);
            }
        }
        imports
    }

    /// Free functions only; methods are attached to their type.
    fn functions(content: &str) -> Vec<FunctionInfo> {
        FN.captures_iter(content)
            .filter(|cap| cap[1].is_empty())
            .map(|cap| FunctionInfo {
                name: cap[3].to_string(),
                parameters: parse_parameters(&cap[4], RECEIVERS),
                visibility: Some(item_visibility(cap.get(2).is_some(), &cap[3])),
            })
            .collect()
    }

    fn classes(content: &str) -> Vec<ClassInfo> {
        let mut classes: Vec<ClassInfo> = TYPE_DECL
            .captures_iter(content)
            .filter(|cap| cap[1].is_empty())
            .map(|cap| {
                let mut class = ClassInfo::new(&cap[4]);
                if &cap[3] == "struct" {
                    if let Some(body) = cap.get(0).and_then(|m| block_after(content, m.end())) {
                        for field in STRUCT_FIELD.captures_iter(body) {
                            push_unique(&mut class.properties, &field[1]);
                        }
                    }
                }
                class
            })
            .collect();

        for cap in IMPL_BLOCK.captures_iter(content) {
            let Some(body) = cap.get(0).and_then(|m| block_after(content, m.end())) else {
                continue;
            };
            if let Some(class) = classes.iter_mut().find(|c| c.name == cap[1]) {
                for method in FN.captures_iter(body) {
                    push_unique(&mut class.methods, &method[3]);
                }
            }
        }
        classes
    }

    fn exports(content: &str) -> Vec<String> {
        let mut exports = Vec::new();
        for cap in PUB_ITEM.captures_iter(content) {
            push_unique(&mut exports, &cap[1]);
        }
        exports
    }
}

fn item_visibility(is_pub: bool, name: &str) -> Visibility {
    if is_pub {
        Visibility::Public
    } else if name.contains("test") {
        Visibility::Test
    } else {
        Visibility::Private
    }
}

/// Text between the first `{` at or after `from` and its matching `}`.
fn block_after(content: &str, from: usize) -> Option<&str> {
    let rest = content.get(from..)?;
    let open = rest.find('{')?;
    // a `;` first means a unit/tuple struct or a forward declaration
    if rest.find(';').is_some_and(|semi| semi < open) {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in rest[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return rest.get(open + 1..open + i);
                }
            }
            _ => {}
        }
    }
    None
}

impl Default for RustAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for RustAnalyzer {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn outline(&self, content: &str) -> SourceOutline {
        SourceOutline {
            functions: Self::functions(content),
            classes: Self::classes(content),
            imports: Self::imports(content),
            exports: Self::exports(content),
        }
    }

    /// Records without exports expose their `pub` functions.
    fn interfaces(&self, record: &FileRecord) -> Vec<InterfaceInfo> {
        if !record.exports.is_empty() {
            return exported_interfaces(record, &record.exports);
        }
        let public: Vec<String> = record
            .functions
            .iter()
            .filter(|f| f.visibility == Some(Visibility::Public))
            .map(|f| f.name.clone())
            .collect();
        exported_interfaces(record, &public)
    }
}
