//! Canonical paths under the project's `.claude/` directory.

use std::path::{Path, PathBuf};

use crate::core::classifier::CONFIG_DIR;

pub const RECORD_FILE: &str = "tdd-loop.local.md";
pub const LOG_FILE: &str = "tdd-loop.log";
pub const CONFIG_FILE: &str = "redgreen.toml";

/// All canonical paths for a project root.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub default_record_path: PathBuf,
    pub default_log_path: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_dir = root.join(CONFIG_DIR);
        Self {
            root: root.clone(),
            config_path: config_dir.join(CONFIG_FILE),
            default_record_path: config_dir.join(RECORD_FILE),
            default_log_path: config_dir.join(LOG_FILE),
            config_dir,
        }
    }

    /// Resolve a configured path relative to the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
