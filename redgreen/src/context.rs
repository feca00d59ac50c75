//! Per-invocation wiring shared by the hook commands.

use std::path::Path;

use tracing::warn;

use crate::core::header::SessionDocument;
use crate::core::record::SessionRecord;
use crate::io::config::{HookConfig, load_config_or_default};
use crate::io::hook_log::HookLog;
use crate::io::paths::ProjectPaths;
use crate::io::session_store::{FileSessionStore, SessionStore};

/// Everything a gate needs for one event: paths, config, record store and log.
#[derive(Debug)]
pub struct HookContext<S = FileSessionStore> {
    pub paths: ProjectPaths,
    pub config: HookConfig,
    pub store: S,
    pub log: HookLog,
}

impl HookContext<FileSessionStore> {
    /// Load `.claude/redgreen.toml` under `root` and open the file store.
    pub fn open(root: &Path) -> Self {
        let paths = ProjectPaths::new(root);
        let config = load_config_or_default(&paths.config_path);
        Self::with_config(paths, config)
    }

    pub fn with_config(paths: ProjectPaths, config: HookConfig) -> Self {
        let store = FileSessionStore::new(paths.resolve(&config.record_path));
        Self::with_store(paths, config, store)
    }
}

impl<S: SessionStore> HookContext<S> {
    pub fn with_store(paths: ProjectPaths, config: HookConfig, store: S) -> Self {
        let log = if config.log_enabled {
            HookLog::new(paths.resolve(&config.log_path))
        } else {
            HookLog::disabled()
        };
        Self {
            paths,
            config,
            store,
            log,
        }
    }

    /// Current session document; an unreadable record counts as absent.
    pub fn load_document(&self) -> Option<SessionDocument> {
        match self.store.load() {
            Ok(doc) => doc,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "session record unreadable; treating as absent");
                None
            }
        }
    }

    pub fn load_record(&self) -> Option<SessionRecord> {
        self.load_document()
            .map(|doc| SessionRecord::from_document(&doc))
    }
}
