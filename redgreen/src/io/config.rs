//! Hook configuration stored under `.claude/redgreen.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::paths::{LOG_FILE, RECORD_FILE};
use crate::core::classifier::CONFIG_DIR;

pub const DEFAULT_COMPLETION_MARKER: &str = "<promise>TDD_COMPLETE</promise>";
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Hook configuration (TOML).
///
/// Every field is optional; missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HookConfig {
    /// Session record location, relative to the project root.
    pub record_path: PathBuf,

    /// Advisory log location, relative to the project root.
    pub log_path: PathBuf,

    /// Set to false to stop appending to the advisory log.
    pub log_enabled: bool,

    /// Literal token the agent emits to finish the loop.
    pub completion_marker: String,

    /// Case-insensitive phrases accepted as completion in SIMPLICITY/REFACTOR.
    pub completion_phrases: Vec<String>,

    /// Stdin bytes read per event; the rest is discarded.
    pub max_payload_bytes: usize,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            record_path: Path::new(CONFIG_DIR).join(RECORD_FILE),
            log_path: Path::new(CONFIG_DIR).join(LOG_FILE),
            log_enabled: true,
            completion_marker: DEFAULT_COMPLETION_MARKER.to_string(),
            completion_phrases: vec![
                "all five phases complete".to_string(),
                "all phases complete".to_string(),
                "tdd cycle complete".to_string(),
                "tdd workflow complete".to_string(),
            ],
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl HookConfig {
    pub fn validate(&self) -> Result<()> {
        if self.completion_marker.trim().is_empty() {
            return Err(anyhow!("completion_marker must not be empty"));
        }
        if self.max_payload_bytes == 0 {
            return Err(anyhow!("max_payload_bytes must be > 0"));
        }
        if self.record_path.as_os_str().is_empty() {
            return Err(anyhow!("record_path must not be empty"));
        }
        if self.record_path.is_absolute() {
            return Err(anyhow!("record_path must be relative to the project root"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `HookConfig::default()`.
pub fn load_config(path: &Path) -> Result<HookConfig> {
    if !path.exists() {
        let cfg = HookConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HookConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config, falling back to defaults when the file is unreadable or invalid.
///
/// Hooks must always reach a decision, so a broken config only costs a warning.
pub fn load_config_or_default(path: &Path) -> HookConfig {
    match load_config(path) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %format!("{err:#}"), "invalid hook config; using defaults");
            HookConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, HookConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("redgreen.toml");
        fs::write(&path, "completion_marker = \"DONE!\"\nlog_enabled = false\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.completion_marker, "DONE!");
        assert!(!cfg.log_enabled);
        assert_eq!(cfg.record_path, HookConfig::default().record_path);
        assert_eq!(cfg.completion_phrases.len(), 4);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("redgreen.toml");

        fs::write(&path, "completion_marker = \"  \"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("completion_marker"));

        fs::write(&path, "record_path = \"/etc/passwd\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("relative"));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("redgreen.toml");
        fs::write(&path, "completion_marker = [unterminated").expect("write");
        assert_eq!(load_config_or_default(&path), HookConfig::default());
    }

    #[test]
    fn serialized_defaults_load_back() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("redgreen.toml");
        let buf = toml::to_string_pretty(&HookConfig::default()).expect("serialize");
        fs::write(&path, buf).expect("write");
        assert_eq!(load_config(&path).expect("load"), HookConfig::default());
    }
}
