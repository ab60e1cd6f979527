//! JavaScript and TypeScript extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_parameters, push_unique, LanguageAnalyzer, SourceOutline};
use crate::core::{ClassInfo, FunctionInfo, Language};

static IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:type\s+)?([^'";]*?)\s*from\s+['"]([^'"]+)['"]"#)
        .expect("valid regex")
});
static IMPORT_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#).expect("valid regex"));
static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex")
});
static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(\w+)\s*(?:<[^>]*>)?\s*\(([^)]*)\)")
        .expect("valid regex")
});
static ARROW_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:const|let|var)\s+(\w+)\s*(?::[^=]+)?=\s*(?:async\s+)?\(([^)]*)\)\s*(?::[^=]+)?=>")
        .expect("valid regex")
});
static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(\w+)")
        .expect("valid regex")
});
static CLASS_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s{2,}(?:public\s+|private\s+|protected\s+|static\s+|async\s+|readonly\s+)*(#?\w+)\s*(\(|[:=;])")
        .expect("valid regex")
});
static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*export\s+(?:default\s+)?(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\s*\*?|class|const|let|var|interface|type|enum)\s+(\w+)")
        .expect("valid regex")
});
static EXPORT_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").expect("valid regex"));
static COMMONJS_EXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:module\.)?exports\.(\w+)\s*=").expect("valid regex")
});

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "constructor", "super", "await",
];

pub struct EcmaScriptAnalyzer {
    language: Language,
}

impl EcmaScriptAnalyzer {
    pub fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }

    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }

    fn imports(content: &str) -> Vec<String> {
        let mut imports = Vec::new();
        for cap in IMPORT_FROM.captures_iter(content) {
            let clause = cap[1].trim();
            let specifier = &cap[2];
            if clause.starts_with('*') {
                // `import * as x from` and `export * from` pull the whole module
                push_unique(&mut imports, format!("{}/*", specifier));
            } else {
                push_unique(&mut imports, specifier);
            }
        }
        for cap in IMPORT_BARE.captures_iter(content) {
            push_unique(&mut imports, &cap[1]);
        }
        for cap in REQUIRE.captures_iter(content) {
            push_unique(&mut imports, &cap[1]);
        }
        imports
    }

    fn functions(content: &str) -> Vec<FunctionInfo> {
        FUNCTION_DECL
            .captures_iter(content)
            .chain(ARROW_FUNCTION.captures_iter(content))
            .map(|cap| FunctionInfo {
                name: cap[1].to_string(),
                parameters: parse_parameters(&cap[2], &[]),
                visibility: None,
            })
            .collect()
    }

    fn classes(content: &str) -> Vec<ClassInfo> {
        let starts: Vec<(usize, String)> = CLASS_DECL
            .captures_iter(content)
            .filter_map(|cap| cap.get(0).map(|m| (m.end(), cap[1].to_string())))
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(i, (start, name))| {
                let end = starts.get(i + 1).map(|(s, _)| *s).unwrap_or(content.len());
                let body = &content[*start..end];
                let mut class = ClassInfo::new(name.clone());
                for member in CLASS_MEMBER.captures_iter(body) {
                    let member_name = &member[1];
                    if CONTROL_KEYWORDS.contains(&member_name) {
                        continue;
                    }
                    if &member[2] == "(" {
                        push_unique(&mut class.methods, member_name);
                    } else {
                        push_unique(&mut class.properties, member_name);
                    }
                }
                class
            })
            .collect()
    }

    fn exports(content: &str) -> Vec<String> {
        let mut exports = Vec::new();
        for cap in EXPORT_DECL.captures_iter(content) {
            push_unique(&mut exports, &cap[1]);
        }
        for cap in EXPORT_LIST.captures_iter(content) {
            for item in cap[1].split(',') {
                // `a as b` exports `b`
                if let Some(name) = item.split_whitespace().last() {
                    push_unique(&mut exports, name);
                }
            }
        }
        for cap in COMMONJS_EXPORT.captures_iter(content) {
            push_unique(&mut exports, &cap[1]);
        }
        exports
    }
}

impl LanguageAnalyzer for EcmaScriptAnalyzer {
    fn language(&self) -> Language {
        self.language
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self.language {
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            _ => &["js", "jsx", "mjs", "cjs"],
        }
    }

    fn outline(&self, content: &str) -> SourceOutline {
        SourceOutline {
            functions: Self::functions(content),
            classes: Self::classes(content),
            imports: Self::imports(content),
            exports: Self::exports(content),
        }
    }
}
