//! Bounded, append-only suggestion history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kitchen::{RecipeTemplate, RenderedRecipe};

use super::skill::SkillTier;

/// One produced suggestion. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub id: Uuid,
    pub template: RecipeTemplate,
    pub confidence: f64,
    pub match_ratio: f64,
    /// Reasoning steps in display order.
    pub reasoning: Vec<String>,
    pub recipe: RenderedRecipe,
    /// Recognized ingredients, canonical names.
    pub ingredients: Vec<String>,
    /// Ingredients the pantry does not know, as typed.
    #[serde(default)]
    pub unrecognized: Vec<String>,
    /// Tier the suggestion was scored at.
    pub tier: SkillTier,
    /// Set when this suggestion pushed the session into a new tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<SkillTier>,
    pub created_at: DateTime<Utc>,
}

/// Ring buffer of the most recent suggestions.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<SuggestionResult>,
    capacity: usize,
}

impl History {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from entries stored oldest first, keeping the newest `capacity`.
    #[must_use]
    pub fn from_entries(entries: Vec<SuggestionResult>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        for entry in entries {
            history.push(entry);
        }
        history
    }

    pub fn push(&mut self, entry: SuggestionResult) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent first, at most `limit` entries.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &SuggestionResult> {
        self.entries.iter().rev().take(limit)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&SuggestionResult> {
        self.entries.back()
    }

    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<&SuggestionResult> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SuggestionResult> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
