//! Filesystem scanner producing the engine's input snapshot.
//!
//! Walks the project with [`FileWalker`], outlines every file with the
//! registered [`LanguageAnalyzer`](crate::languages::LanguageAnalyzer) for its
//! extension and summarizes the language mix.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ArchmapConfig;
use crate::core::{
    AnalysisInput, Error, FileRecord, Language, LanguageSummary, ProjectStructure, Result,
};
use crate::io::walker::FileWalker;
use crate::languages::LanguageRegistry;

/// Files larger than this are recorded by path only.
const MAX_OUTLINE_BYTES: u64 = 2 * 1024 * 1024;

const PROGRESS_TEMPLATE: &str = "{spinner} Scanning [{bar:40}] {pos}/{len} files";

/// Scan `root` into an [`AnalysisInput`] with all required sets present.
pub fn scan_project(
    root: &Path,
    config: &ArchmapConfig,
    registry: &LanguageRegistry,
    show_progress: bool,
) -> Result<AnalysisInput> {
    if !root.is_dir() {
        return Err(Error::scan("not a directory", root));
    }

    let walked = FileWalker::new(root.to_path_buf())
        .with_ignore_dirs(config.modules.ignore_dirs.clone())
        .walk()
        .map_err(|e| Error::scan(e.to_string(), root))?;
    info!(
        files = walked.files.len(),
        directories = walked.directories.len(),
        "Scanning project"
    );

    let progress = progress_bar(walked.files.len() as u64, show_progress);
    let files: Vec<FileRecord> = walked
        .files
        .par_iter()
        .progress_with(progress.clone())
        .map(|relative| scan_file(root, relative, registry))
        .collect();
    progress.finish_and_clear();

    let language = summarize_languages(&files);
    debug!(primary = %language.primary, "Primary language detected");

    Ok(AnalysisInput::new(root)
        .with_structure(ProjectStructure {
            directories: walked.directories,
            total_files: files.len(),
        })
        .with_language(language)
        .with_files(files))
}

fn progress_bar(len: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        bar.set_style(style.progress_chars("█▓▒░  "));
    }
    bar
}

/// Outline one file. Unreadable or oversized files keep their path only.
fn scan_file(root: &Path, relative: &str, registry: &LanguageRegistry) -> FileRecord {
    let mut record = FileRecord::new(relative);
    let path = root.join(relative);

    let Some(analyzer) = registry.for_path(relative) else {
        record.line_count = read_text(&path).map(|c| c.lines().count()).unwrap_or(0);
        return record;
    };

    let Some(content) = read_text(&path) else {
        return record;
    };
    let outline = analyzer.outline(&content);
    record.line_count = content.lines().count();
    record.functions = outline.functions;
    record.classes = outline.classes;
    record.imports = outline.imports;
    record.exports = outline.exports;
    record
}

fn read_text(path: &Path) -> Option<String> {
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size > MAX_OUTLINE_BYTES {
        debug!(path = %path.display(), size, "Skipping oversized file");
        return None;
    }
    match fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes).ok(),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Most frequent known language; ties go to the alphabetically first name.
pub fn summarize_languages(files: &[FileRecord]) -> LanguageSummary {
    let counts: BTreeMap<Language, usize> = files
        .iter()
        .map(FileRecord::language)
        .filter(|l| *l != Language::Unknown)
        .fold(BTreeMap::new(), |mut acc, language| {
            *acc.entry(language).or_insert(0) += 1;
            acc
        });

    let primary = counts
        .iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.name().cmp(a.name())))
        .map(|(language, _)| *language)
        .unwrap_or_default();

    LanguageSummary { primary, counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileCategory;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_builds_complete_snapshot() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/auth/login.ts",
            "import { query } from '../db/client';\nexport function login(user) {}\n",
        );
        write(dir.path(), "src/db/client.ts", "export function query(sql) {}\n");
        write(dir.path(), "src/auth/login.test.ts", "test('x', () => {});\n");
        write(dir.path(), "README.md", "# demo\n");
        write(dir.path(), "node_modules/x/index.js", "module.exports = 1;\n");

        let registry = LanguageRegistry::with_defaults();
        let input = scan_project(dir.path(), &ArchmapConfig::default(), &registry, false).unwrap();

        let files = input.files.as_ref().unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "README.md",
                "src/auth/login.test.ts",
                "src/auth/login.ts",
                "src/db/client.ts"
            ]
        );
        assert_eq!(input.language.as_ref().unwrap().primary, Language::TypeScript);
        assert_eq!(
            input.structure.as_ref().unwrap().directories,
            vec!["src", "src/auth", "src/db"]
        );

        let login = &files[2];
        assert_eq!(login.imports, vec!["../db/client"]);
        assert_eq!(login.line_count, 2);
        assert!(login.complexity.is_none());
        assert_eq!(files[1].category(), FileCategory::Test);
        assert_eq!(files[0].category(), FileCategory::Documentation);
    }

    #[test]
    fn missing_root_is_a_scan_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_project(
            &dir.path().join("absent"),
            &ArchmapConfig::default(),
            &LanguageRegistry::with_defaults(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Scan { .. }));
    }

    #[test]
    fn language_ties_break_by_name() {
        let files = vec![
            FileRecord::new("a.py"),
            FileRecord::new("b.go"),
            FileRecord::new("notes.txt"),
        ];
        let summary = summarize_languages(&files);
        assert_eq!(summary.primary, Language::Go);
        assert_eq!(summary.counts.len(), 2);
        assert_eq!(summarize_languages(&[]).primary, Language::Unknown);
    }
}
