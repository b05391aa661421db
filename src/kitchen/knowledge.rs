//! Knowledge base loading.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ChefError, Result};

use super::catalog::{Catalog, RecipeTemplate};
use super::pantry::{Pantry, PantryItem};

const BUILTIN: &str = include_str!("knowledge.toml");

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(rename = "ingredient", default)]
    ingredients: Vec<PantryItem>,
    #[serde(rename = "recipe", default)]
    recipes: Vec<RecipeTemplate>,
}

/// Pantry plus recipe catalog, loaded once at startup.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub pantry: Pantry,
    pub catalog: Catalog,
}

impl KnowledgeBase {
    /// The knowledge base compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ChefError::Catalog(format!("read knowledge base {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|err| ChefError::Catalog(format!("{}: {err}", path.display())))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: KnowledgeFile = toml::from_str(raw)
            .map_err(|err| ChefError::Catalog(format!("parse knowledge base: {err}")))?;
        Self::from_parts(file.ingredients, file.recipes)
    }

    pub fn from_parts(ingredients: Vec<PantryItem>, recipes: Vec<RecipeTemplate>) -> Result<Self> {
        let pantry = Pantry::new(ingredients);
        let catalog = Catalog::new(recipes, &pantry)?;
        if catalog.is_empty() {
            return Err(ChefError::Catalog("knowledge base has no recipes".to_string()));
        }
        debug!(
            ingredients = pantry.len(),
            recipes = catalog.len(),
            "knowledge base loaded"
        );
        Ok(Self { pantry, catalog })
    }

    /// Load from `path` when given, otherwise the built-in data.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(Self::builtin, Self::from_path)
    }
}
