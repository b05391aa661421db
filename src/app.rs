use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ChefError, Result};
use crate::kitchen::KnowledgeBase;
use crate::storage::{MemoryStore, StateStore, open_store};
use crate::suggestions::{ChefSession, Recommender, SharedSession};

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub store: Arc<dyn StateStore>,
    pub session: SharedSession,
    /// Set when saved state could not be opened or read and the session
    /// started fresh in memory.
    pub storage_warning: Option<String>,
    pub robot_mode: bool,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let mut ctx = Self::open(root, config)?;
        ctx.robot_mode = cli.robot;
        ctx.verbosity = cli.verbose;
        if !ctx.config.output.color {
            console::set_colors_enabled(false);
        }
        Ok(ctx)
    }

    /// Build the knowledge base, store and session for `root`.
    pub fn open(root: PathBuf, config: Config) -> Result<Self> {
        std::fs::create_dir_all(&root)?;

        let knowledge = KnowledgeBase::load(config.catalog.path.as_deref())?;
        let recommender = Recommender::new(knowledge, config.engine.policy()?)
            .with_preferred_cuisine(config.engine.preferred_cuisine);
        let capacity = config.engine.history_capacity;

        let mut storage_warning = None;
        let store: Arc<dyn StateStore> = match open_store(&config.storage, &root) {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "could not open session store; continuing in memory");
                storage_warning = Some(err.to_string());
                Arc::new(MemoryStore::default())
            }
        };

        let (session, load_error) =
            ChefSession::load_or_default(Arc::new(recommender), capacity, store.as_ref());
        if let Some(err) = load_error {
            storage_warning = storage_warning.or_else(|| Some(err.to_string()));
        }
        debug!(root = %root.display(), backend = store.name(), "app context ready");

        Ok(Self {
            root,
            config,
            session: SharedSession::with_store(session, Arc::clone(&store)),
            store,
            storage_warning,
            robot_mode: false,
            verbosity: 0,
        })
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("CHEFAI_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ChefError::Config("data directory not found".to_string()))?;
        Ok(data_dir.join("chefai"))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current storage problem to show the user: a failed save in this run,
    /// else the problem found when opening the store.
    #[must_use]
    pub fn storage_note(&self) -> Option<String> {
        self.session
            .save_error()
            .or_else(|| self.storage_warning.clone())
    }
}
