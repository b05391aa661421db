//! The controller that owns skill state, history and pairings.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ChefError, Result};
use crate::kitchen::{IngredientSet, normalize_tag, parse_ingredients};
use crate::storage::{SessionRecord, StateStore, StoredSession};

use super::engine::Recommender;
use super::feedback::{Experiment, Pairing, PairingLedger, Rating};
use super::history::{History, SuggestionResult};
use super::skill::{SkillState, SkillTier};

/// Read-only view handed to the display layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub tier: SkillTier,
    pub interaction_count: u64,
    /// Fraction of the way to the next tier threshold.
    pub progress: f64,
    pub next_threshold: Option<u64>,
    pub confidence: f64,
    pub history_count: u64,
    pub history_retained: usize,
    pub known_ingredients: usize,
    pub recipe_templates: usize,
    pub ingredient_pairs: usize,
    pub feedback_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackOutcome {
    pub result_id: Uuid,
    pub recipe: String,
    pub rating: Rating,
    pub pairs_updated: usize,
}

/// Single owner of a cook's session state.
///
/// Failed requests leave every field untouched.
#[derive(Debug, Clone)]
pub struct ChefSession {
    recommender: Arc<Recommender>,
    skill: SkillState,
    history: History,
    history_count: u64,
    pairings: PairingLedger,
}

impl ChefSession {
    #[must_use]
    pub fn new(recommender: Arc<Recommender>, history_capacity: usize) -> Self {
        Self {
            recommender,
            skill: SkillState::new(),
            history: History::new(history_capacity),
            history_count: 0,
            pairings: PairingLedger::new(),
        }
    }

    #[must_use]
    pub fn restore(recommender: Arc<Recommender>, history_capacity: usize, stored: StoredSession) -> Self {
        let StoredSession {
            record, history, pairings, ..
        } = stored;
        let history = History::from_entries(history, history_capacity);
        let history_count = record.history_count.max(history.len() as u64);
        Self {
            recommender,
            skill: SkillState::restore(record.interaction_count, record.skill_tier, record.confidence),
            history,
            history_count,
            pairings,
        }
    }

    /// Restore from `store`, falling back to a fresh session if it cannot be read.
    /// The load error, if any, is returned alongside for display.
    pub fn load_or_default(
        recommender: Arc<Recommender>,
        history_capacity: usize,
        store: &dyn StateStore,
    ) -> (Self, Option<ChefError>) {
        match store.load() {
            Ok(Some(stored)) => {
                debug!(
                    backend = store.name(),
                    interactions = stored.record.interaction_count,
                    "session restored"
                );
                (Self::restore(recommender, history_capacity, stored), None)
            }
            Ok(None) => (Self::new(recommender, history_capacity), None),
            Err(err) => {
                warn!(backend = store.name(), error = %err, "could not load saved session; starting fresh");
                (Self::new(recommender, history_capacity), Some(err))
            }
        }
    }

    /// Bring the session up to date with what the store holds right now.
    ///
    /// An empty store means a fresh session. An unreadable one keeps the
    /// in-memory state so the next save can replace the bad copy.
    pub fn sync(&mut self, latest: Result<Option<StoredSession>>) {
        match latest {
            Ok(Some(stored)) => {
                *self = Self::restore(Arc::clone(&self.recommender), self.history.capacity(), stored);
            }
            Ok(None) => {
                *self = Self::new(Arc::clone(&self.recommender), self.history.capacity());
            }
            Err(err) => {
                warn!(error = %err, "saved session unreadable; keeping in-memory state");
            }
        }
    }

    /// Parse free text and suggest.
    pub fn suggest_text(&mut self, text: &str) -> Result<SuggestionResult> {
        let ingredients = parse_ingredients(text)?;
        self.suggest(&ingredients)
    }

    /// Pick a recipe for `ingredients`, count the interaction and record it.
    pub fn suggest(&mut self, ingredients: &IngredientSet) -> Result<SuggestionResult> {
        let eval = self.recommender.evaluate(ingredients, &self.skill)?;
        let promoted_to = self
            .skill
            .record_success(eval.confidence, self.recommender.policy());

        let result = SuggestionResult {
            id: Uuid::new_v4(),
            template: eval.template.clone(),
            confidence: eval.confidence,
            match_ratio: eval.match_ratio,
            reasoning: eval.reasoning,
            recipe: eval.recipe,
            ingredients: eval.input.known,
            unrecognized: eval.input.unknown,
            tier: eval.tier,
            promoted_to,
            created_at: Utc::now(),
        };

        info!(
            template_id = result.template.id,
            confidence = result.confidence,
            interactions = self.skill.interaction_count(),
            "suggestion made"
        );
        if let Some(tier) = promoted_to {
            info!(%tier, "skill tier advanced");
        }

        self.history.push(result.clone());
        self.history_count = self.history_count.saturating_add(1);
        Ok(result)
    }

    /// Most recent first, at most `limit` entries.
    #[must_use]
    pub fn history(&self, limit: usize) -> Vec<&SuggestionResult> {
        self.history.recent(limit).collect()
    }

    #[must_use]
    pub const fn skill(&self) -> &SkillState {
        &self.skill
    }

    #[must_use]
    pub const fn recommender(&self) -> &Arc<Recommender> {
        &self.recommender
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let policy = self.recommender.policy();
        let knowledge = self.recommender.knowledge();
        SessionSnapshot {
            tier: self.skill.tier(),
            interaction_count: self.skill.interaction_count(),
            progress: policy.progress(&self.skill),
            next_threshold: policy.next_threshold(self.skill.tier()),
            confidence: self.skill.confidence(),
            history_count: self.history_count,
            history_retained: self.history.len(),
            known_ingredients: knowledge.pantry.len(),
            recipe_templates: knowledge.catalog.len(),
            ingredient_pairs: self.pairings.pair_count(),
            feedback_count: self.pairings.feedback_count(),
        }
    }

    /// Rate a suggestion still held in history; the latest when `result_id` is `None`.
    pub fn record_feedback(&mut self, result_id: Option<Uuid>, rating: Rating) -> Result<FeedbackOutcome> {
        let result = match result_id {
            Some(id) => self
                .history
                .find(id)
                .ok_or_else(|| ChefError::NotFound(format!("suggestion {id}")))?,
            None => self
                .history
                .latest()
                .ok_or_else(|| ChefError::NotFound("no suggestions to rate yet".to_string()))?,
        };
        let pairs_updated = self.pairings.record(result.id, &result.ingredients, rating)?;
        info!(result_id = %result.id, %rating, pairs_updated, "feedback recorded");
        Ok(FeedbackOutcome {
            result_id: result.id,
            recipe: result.template.name.clone(),
            rating,
            pairs_updated,
        })
    }

    /// Pairing scores for one ingredient, accepting aliases.
    #[must_use]
    pub fn pairings(&self, ingredient: &str) -> Vec<Pairing> {
        let tag = normalize_tag(ingredient);
        let pantry = &self.recommender.knowledge().pantry;
        let name = pantry.canonical(&tag).unwrap_or(&tag);
        self.pairings.partners(name)
    }

    /// Untried ingredient pairs worth a go, best first.
    #[must_use]
    pub fn experiments(&self) -> Vec<Experiment> {
        self.pairings.experiments()
    }

    /// Forget everything and start again at Beginner.
    pub fn reset(&mut self) {
        self.skill = SkillState::new();
        self.history.clear();
        self.history_count = 0;
        self.pairings = PairingLedger::new();
        info!("session reset");
    }

    /// Rated ids whose suggestion has left history are dropped; they can no
    /// longer be looked up to rate again.
    #[must_use]
    pub fn to_stored(&self) -> StoredSession {
        let mut pairings = self.pairings.clone();
        pairings.retain_rated(|id| self.history.find(*id).is_some());
        StoredSession {
            record: SessionRecord {
                interaction_count: self.skill.interaction_count(),
                skill_tier: self.skill.tier(),
                history_count: self.history_count,
                confidence: self.skill.confidence(),
            },
            history: self.history.iter().cloned().collect(),
            pairings,
            saved_at: Some(Utc::now()),
        }
    }

    /// Write to `store`. Failures are logged and returned, never raised.
    pub fn persist(&self, store: &dyn StateStore) -> Option<ChefError> {
        match store.save(&self.to_stored()) {
            Ok(()) => None,
            Err(err) => {
                warn!(backend = store.name(), error = %err, "could not save session; continuing in memory");
                Some(err)
            }
        }
    }
}
