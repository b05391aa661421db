//! JSON file storage for session state.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ChefError, Result};

use super::{StateStore, StoredSession, UpdateFn};

/// Pretty-printed JSON file, replaced atomically on save.
///
/// Every write holds an exclusive lock on a sidecar `.lock` file, so
/// processes sharing one data root take turns. Reads that feed a write
/// happen under the same lock through [`StateStore::update`].
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

/// Held exclusive lock; released on drop.
struct LockGuard(File);

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

impl JsonStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    fn lock(&self) -> Result<LockGuard> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ChefError::persistence("create state directory", err))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|err| ChefError::persistence("open state lock", err))?;
        file.lock_exclusive()
            .map_err(|err| ChefError::persistence("lock state", err))?;
        Ok(LockGuard(file))
    }

    fn read(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|err| ChefError::persistence("read state", err))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let session: StoredSession = serde_json::from_str(&raw).map_err(|err| {
            ChefError::persistence(&format!("parse {}", self.path.display()), err)
        })?;
        Ok(Some(session))
    }

    /// Replace the file. The caller holds the lock.
    fn write(&self, session: &StoredSession) -> Result<()> {
        let payload = serde_json::to_string_pretty(session)
            .map_err(|err| ChefError::persistence("serialize state", err))?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|err| ChefError::persistence("create temp state", err))?;
        tmp.write_all(payload.as_bytes())
            .map_err(|err| ChefError::persistence("write state", err))?;
        tmp.persist(&self.path)
            .map_err(|err| ChefError::persistence("replace state", err.error))?;
        debug!(path = %self.path.display(), bytes = payload.len(), "state saved");
        Ok(())
    }
}

impl StateStore for JsonStore {
    fn name(&self) -> &'static str {
        "json"
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        self.read()
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let _guard = self.lock()?;
        self.write(session)
    }

    fn update(&self, apply: &mut UpdateFn<'_>) -> Result<()> {
        let _guard = self.lock()?;
        match apply(self.read()) {
            Some(next) => self.write(&next),
            None => Ok(()),
        }
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ChefError::persistence("remove state", err)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
