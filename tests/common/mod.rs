#![allow(dead_code)]

use archmap::core::{AnalysisInput, FileRecord, Language, LanguageSummary, ProjectStructure};

pub fn file(path: &str, imports: &[&str]) -> FileRecord {
    let mut record = FileRecord::new(path);
    record.imports = imports.iter().map(|s| s.to_string()).collect();
    record
}

pub fn exporting(path: &str, imports: &[&str], exports: &[&str]) -> FileRecord {
    let mut record = file(path, imports);
    record.exports = exports.iter().map(|s| s.to_string()).collect();
    record
}

pub fn snapshot(root: &str, language: Language, files: Vec<FileRecord>) -> AnalysisInput {
    AnalysisInput::new(root)
        .with_structure(ProjectStructure::default())
        .with_language(LanguageSummary {
            primary: language,
            counts: Default::default(),
        })
        .with_files(files)
}

/// Small layered web project: routes -> auth -> db, routes -> db.
pub fn layered_project() -> AnalysisInput {
    snapshot(
        "/work/shop",
        Language::TypeScript,
        vec![
            file("src/routes/users.ts", &["../auth", "../db/client", "express"]),
            exporting("src/auth/login.ts", &["../db/client"], &["login"]),
            file("src/auth/login.test.ts", &["./login"]),
            exporting("src/db/client.ts", &["pg"], &["query"]),
            file("README.md", &[]),
        ],
    )
}
