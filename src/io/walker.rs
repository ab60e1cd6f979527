use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Files and directories found under one project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkOutput {
    /// Files relative to the root, forward slashes, sorted
    pub files: Vec<String>,
    /// Directories relative to the root, forward slashes, sorted
    pub directories: Vec<String>,
}

pub struct FileWalker {
    root: PathBuf,
    ignore_dirs: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_dirs: vec![],
        }
    }

    /// Directory names pruned from the walk, compared case-insensitively.
    pub fn with_ignore_dirs(mut self, dirs: Vec<String>) -> Self {
        self.ignore_dirs = dirs;
        self
    }

    pub fn walk(&self) -> Result<WalkOutput> {
        let ignore_dirs = self.ignore_dirs.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                let name = entry.file_name().to_string_lossy();
                !(is_dir && entry.depth() > 0 && ignore_dirs.iter().any(|d| d.eq_ignore_ascii_case(&name)))
            })
            .build();

        let mut output = WalkOutput::default();
        for entry in walker {
            let entry = entry?;
            if entry.depth() == 0 {
                continue;
            }
            let Some(relative) = self.relative(entry.path()) else {
                continue;
            };
            match entry.file_type() {
                Some(t) if t.is_dir() => output.directories.push(relative),
                Some(t) if t.is_file() => output.files.push(relative),
                _ => {}
            }
        }

        output.files.sort();
        output.directories.sort();
        Ok(output)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_prunes_ignored_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/auth")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/auth/login.ts"), "export {}").unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "").unwrap();
        fs::write(dir.path().join("README.md"), "# demo").unwrap();

        let output = FileWalker::new(dir.path().to_path_buf())
            .with_ignore_dirs(vec!["Node_Modules".into()])
            .walk()
            .unwrap();

        assert_eq!(output.files, vec!["README.md", "src/auth/login.ts"]);
        assert_eq!(output.directories, vec!["src", "src/auth"]);
    }
}
