use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::error::{ChefError, Result};
use crate::kitchen::{
    CuisineStyle, KnowledgeBase, RecipeTemplate, RenderedRecipe, StepTemplate,
};
use crate::storage::{StateStore, StoredSession, UpdateFn};
use crate::suggestions::{ChefSession, Recommender, SkillTier, SuggestionResult, TierPolicy};

/// Test fixture providing isolated filesystem environment.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            data_path,
        }
    }

    /// Create a test file with content.
    #[must_use]
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write a knowledge base file and return its path.
    #[must_use]
    pub fn create_knowledge(&self, content: &str) -> PathBuf {
        self.create_file("knowledge.toml", content)
    }
}

/// A small template over builtin pantry tags.
#[must_use]
pub fn template(id: u32, name: &str, required: &[&str]) -> RecipeTemplate {
    RecipeTemplate {
        id,
        name: name.to_string(),
        cuisine: CuisineStyle::Homestyle,
        required: required.iter().map(ToString::to_string).collect(),
        optional: BTreeSet::new(),
        difficulty: 2,
        steps: vec![
            StepTemplate {
                text: "Prep the {required}".to_string(),
                minutes: [5, 10],
            },
            StepTemplate {
                text: "Cook with {extras}".to_string(),
                minutes: [10, 15],
            },
        ],
        sides: Vec::new(),
    }
}

/// Builtin pantry with only the given `(id, required)` templates.
#[must_use]
pub fn recommender_with(templates: &[(u32, &[&str])]) -> Recommender {
    let builtin = KnowledgeBase::builtin().expect("builtin knowledge base");
    let items = builtin.pantry.items().cloned().collect();
    let recipes = templates
        .iter()
        .map(|(id, required)| template(*id, &format!("Template {id}"), required))
        .collect();
    let knowledge = KnowledgeBase::from_parts(items, recipes).expect("fixture knowledge base");
    Recommender::new(knowledge, TierPolicy::default())
}

/// T1 `{chicken, garlic}` and T2 `{tomato, onion, garlic}`.
#[must_use]
pub fn scenario_recommender() -> Recommender {
    recommender_with(&[
        (1, &["chicken", "garlic"][..]),
        (2, &["tomato", "onion", "garlic"][..]),
    ])
}

/// Fresh session over the builtin knowledge base with default settings.
#[must_use]
pub fn builtin_session() -> ChefSession {
    let knowledge = KnowledgeBase::builtin().expect("builtin knowledge base");
    ChefSession::new(
        Arc::new(Recommender::new(knowledge, TierPolicy::default())),
        50,
    )
}

/// A standalone result for history tests.
#[must_use]
pub fn sample_result(id: u32) -> SuggestionResult {
    let template = template(id, &format!("Sample {id}"), &["egg"]);
    SuggestionResult {
        id: Uuid::new_v4(),
        recipe: RenderedRecipe {
            title: template.name.clone(),
            ingredients: Vec::new(),
            steps: Vec::new(),
            total_time: "15-25 minutes".to_string(),
            difficulty: "Easy".to_string(),
            sides: Vec::new(),
        },
        template,
        confidence: 0.6,
        match_ratio: 1.0,
        reasoning: vec!["sample".to_string()],
        ingredients: vec!["egg".to_string()],
        unrecognized: Vec::new(),
        tier: SkillTier::Beginner,
        promoted_to: None,
        created_at: Utc::now(),
    }
}

/// Store whose every operation fails.
#[derive(Debug, Default)]
pub struct BrokenStore;

impl StateStore for BrokenStore {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn load(&self) -> Result<Option<StoredSession>> {
        Err(ChefError::persistence("load session", "disk unavailable"))
    }

    fn save(&self, _session: &StoredSession) -> Result<()> {
        Err(ChefError::persistence("save session", "disk unavailable"))
    }

    fn update(&self, _apply: &mut UpdateFn<'_>) -> Result<()> {
        Err(ChefError::persistence("lock session", "disk unavailable"))
    }

    fn clear(&self) -> Result<()> {
        Err(ChefError::persistence("clear session", "disk unavailable"))
    }

    fn location(&self) -> String {
        "(nowhere)".to_string()
    }
}
