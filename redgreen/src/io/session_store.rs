//! Session record storage.
//!
//! Readers never lock: every write goes to a uniquely named temp file in the
//! record's directory and is renamed over the record, so a reader sees either
//! the previous or the next complete document. Writers that read-modify-write
//! hold an exclusive `flock` on a `<record>.lock` sidecar for the whole
//! sequence so concurrent increments are not lost.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::header::SessionDocument;

/// Storage port for the session record.
pub trait SessionStore {
    /// Held for the duration of a read-modify-write.
    type Guard<'a>
    where
        Self: 'a;

    /// Read the current document. `Ok(None)` means no active session.
    fn load(&self) -> Result<Option<SessionDocument>>;

    /// Block until this caller is the only writer.
    fn lock(&self) -> Result<Self::Guard<'_>>;

    /// Atomically replace the stored document.
    fn replace(&self, doc: &SessionDocument) -> Result<()>;
}

/// Session record kept in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

/// Exclusive lock on the record's sidecar; released on drop.
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            debug!(error = %err, "unlock session record");
        }
    }
}

impl SessionStore for FileSessionStore {
    type Guard<'a>
        = FileLockGuard
    where
        Self: 'a;

    fn load(&self) -> Result<Option<SessionDocument>> {
        debug!(path = %self.path.display(), "loading session record");
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("read session record {}", self.path.display()));
            }
        };
        let contents = String::from_utf8_lossy(&bytes);
        Ok(Some(SessionDocument::parse(&contents)))
    }

    fn lock(&self) -> Result<FileLockGuard> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .with_context(|| format!("open lock {}", self.lock_path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("lock {}", self.lock_path.display()))?;
        Ok(FileLockGuard { file })
    }

    fn replace(&self, doc: &SessionDocument) -> Result<()> {
        debug!(path = %self.path.display(), "replacing session record");
        write_atomic(&self.path, &doc.render())
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp session record in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp session record {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync temp session record {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("replace session record {}", path.display()))?;
    Ok(())
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemorySessionStore;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use std::sync::{Mutex, MutexGuard};

    use anyhow::{Result, anyhow};

    use super::SessionStore;
    use crate::core::header::SessionDocument;

    /// In-memory store for gate tests. Can be told to fail writes.
    #[derive(Debug, Default)]
    pub struct MemorySessionStore {
        contents: Mutex<Option<String>>,
        writer: Mutex<()>,
        fail_writes: bool,
    }

    impl MemorySessionStore {
        pub fn empty() -> Self {
            Self::default()
        }

        pub fn with_contents(contents: &str) -> Self {
            Self {
                contents: Mutex::new(Some(contents.to_string())),
                ..Self::default()
            }
        }

        pub fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        pub fn contents(&self) -> Option<String> {
            self.contents.lock().expect("store mutex").clone()
        }
    }

    impl SessionStore for MemorySessionStore {
        type Guard<'a>
            = MutexGuard<'a, ()>
        where
            Self: 'a;

        fn load(&self) -> Result<Option<SessionDocument>> {
            let contents = self.contents.lock().map_err(|_| anyhow!("store poisoned"))?;
            Ok(contents.as_deref().map(SessionDocument::parse))
        }

        fn lock(&self) -> Result<MutexGuard<'_, ()>> {
            self.writer.lock().map_err(|_| anyhow!("store poisoned"))
        }

        fn replace(&self, doc: &SessionDocument) -> Result<()> {
            if self.fail_writes {
                return Err(anyhow!("simulated write failure"));
            }
            let mut contents = self.contents.lock().map_err(|_| anyhow!("store poisoned"))?;
            *contents = Some(doc.render());
            Ok(())
        }
    }
}
