use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::core::ArchmapConfig;
use crate::core::{Error, Result, ResultExt};

pub const CONFIG_FILE_NAME: &str = ".archmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Read config file contents
pub(crate) fn read_config_file(path: &Path) -> std::io::Result<String> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse and validate config from a TOML string
pub fn parse_and_validate_config(contents: &str) -> Result<ArchmapConfig> {
    let config: ArchmapConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load an explicitly named config file; every failure is reported.
pub fn load_config_file(path: &Path) -> Result<ArchmapConfig> {
    let contents = read_config_file(path)
        .map_err(Error::from)
        .context(format!("reading {}", path.display()))?;
    parse_and_validate_config(&contents).context(format!("parsing {}", path.display()))
}

/// Try loading config from a specific path, logging anything but "not found"
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<ArchmapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            warn!(
                "Ignoring {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            None
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// `start` and its ancestors, nearest first, at most `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.archmap.toml`, falling back to defaults.
pub fn load_config(start: &Path) -> ArchmapConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            ArchmapConfig::default()
        })
}

/// Default configuration rendered as TOML, as written by `archmap init`.
pub fn default_config_toml() -> Result<String> {
    let body = toml::to_string_pretty(&ArchmapConfig::default())?;
    Ok(format!("# archmap configuration\n\n{}", body))
}
