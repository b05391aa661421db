//! Serialized access to one session from many callers.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ChefError, Result};
use crate::kitchen::IngredientSet;
use crate::storage::StateStore;

use super::feedback::Rating;
use super::history::SuggestionResult;
use super::session::{ChefSession, FeedbackOutcome, SessionSnapshot};

/// Cloneable handle that funnels every mutation through one lock.
///
/// With a store attached, a mutation runs inside [`StateStore::update`]:
/// the session is first brought up to date with the saved state, then
/// changed, then saved, all under the store's exclusive lock. Other
/// processes sharing the store therefore never lose each other's updates.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<ChefSession>>,
    store: Option<Arc<dyn StateStore>>,
    save_error: Arc<Mutex<Option<String>>>,
}

impl SharedSession {
    #[must_use]
    pub fn new(session: ChefSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            store: None,
            save_error: Arc::new(Mutex::new(None)),
        }
    }

    /// The store is the source of truth: the first mutation replaces
    /// `session` with whatever the store holds.
    #[must_use]
    pub fn with_store(session: ChefSession, store: Arc<dyn StateStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::new(session)
        }
    }

    pub fn suggest(&self, ingredients: &IngredientSet) -> Result<SuggestionResult> {
        self.mutate(|session| session.suggest(ingredients))
    }

    pub fn record_feedback(&self, result_id: Option<Uuid>, rating: Rating) -> Result<FeedbackOutcome> {
        self.mutate(|session| session.record_feedback(result_id, rating))
    }

    /// Reset and return the state as it was just before.
    pub fn reset(&self) -> SessionSnapshot {
        let outcome = self.mutate(|session| {
            let before = session.snapshot();
            session.reset();
            Ok(before)
        });
        outcome.unwrap_or_else(|_| self.snapshot())
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().snapshot()
    }

    #[must_use]
    pub fn history(&self, limit: usize) -> Vec<SuggestionResult> {
        self.inner
            .lock()
            .history(limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run `f` against the session while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&ChefSession) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Why the most recent save failed, if it did.
    #[must_use]
    pub fn save_error(&self) -> Option<String> {
        self.save_error.lock().clone()
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut ChefSession) -> Result<T>) -> Result<T> {
        let mut session = self.inner.lock();
        let Some(store) = &self.store else {
            return op(&mut session);
        };

        let mut op = Some(op);
        let mut outcome = None;
        let written = store.update(&mut |latest| {
            session.sync(latest);
            let op = op.take()?;
            let result = op(&mut session);
            let next = result.is_ok().then(|| session.to_stored());
            outcome = Some(result);
            next
        });

        match written {
            Ok(()) => *self.save_error.lock() = None,
            Err(err) => {
                warn!(backend = store.name(), error = %err, "could not save session; continuing in memory");
                *self.save_error.lock() = Some(err.to_string());
            }
        }
        match (outcome, op.take()) {
            (Some(result), _) => result,
            // The store failed before the update ran; apply it in memory.
            (None, Some(op)) => op(&mut session),
            (None, None) => Err(ChefError::Persistence(
                "session update ended without a result".to_string(),
            )),
        }
    }
}
