//! Storage layer for chefai
//!
//! A session is persisted as one [`StoredSession`] through a [`StateStore`]:
//! a JSON file by default, or SQLite.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::suggestions::{PairingLedger, SkillTier, SuggestionResult};

pub mod json;
pub mod sqlite;

pub use json::JsonStore;
pub use sqlite::SqliteStore;

/// The small skill record that must survive a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub interaction_count: u64,
    pub skill_tier: SkillTier,
    pub history_count: u64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub record: SessionRecord,
    /// Oldest first.
    #[serde(default)]
    pub history: Vec<SuggestionResult>,
    #[serde(default)]
    pub pairings: PairingLedger,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Callback for [`StateStore::update`]: sees the latest saved state (or why it
/// could not be read) and returns the state to write, or `None` to write
/// nothing.
pub type UpdateFn<'a> = dyn FnMut(Result<Option<StoredSession>>) -> Option<StoredSession> + 'a;

/// Load/save for one session. Implementations report failures as
/// [`crate::ChefError::Persistence`].
pub trait StateStore: Send + Sync {
    /// Short backend name for logs and output.
    fn name(&self) -> &'static str;

    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<StoredSession>>;

    fn save(&self, session: &StoredSession) -> Result<()>;

    /// Load, apply and save while holding the store's exclusive lock, so
    /// writers in other processes cannot interleave.
    fn update(&self, apply: &mut UpdateFn<'_>) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Where the state lives, for display.
    fn location(&self) -> String;
}

/// Store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<StoredSession>>,
}

impl StateStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.state.lock() = Some(session.clone());
        Ok(())
    }

    fn update(&self, apply: &mut UpdateFn<'_>) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(next) = apply(Ok(state.clone())) {
            *state = Some(next);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.state.lock() = None;
        Ok(())
    }

    fn location(&self) -> String {
        "(in memory)".to_string()
    }
}

/// Open the configured backend under `root`.
pub fn open_store(config: &StorageConfig, root: &Path) -> Result<Arc<dyn StateStore>> {
    let store: Arc<dyn StateStore> = match config.backend {
        StorageBackend::Json => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(|| root.join("state.json"));
            Arc::new(JsonStore::new(path))
        }
        StorageBackend::Sqlite => {
            let path = config
                .path
                .clone()
                .unwrap_or_else(|| root.join("chefai.db"));
            Arc::new(SqliteStore::open(path)?)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::default()),
    };
    Ok(store)
}
