//! Ingredient half of the knowledge base.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ingredients::{IngredientSet, normalize_tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Protein,
    Vegetable,
    Fruit,
    Grain,
    Legume,
    Dairy,
    Aromatic,
    Herb,
    Spice,
    Condiment,
    Fat,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Protein => "protein",
            Self::Vegetable => "vegetable",
            Self::Fruit => "fruit",
            Self::Grain => "grain",
            Self::Legume => "legume",
            Self::Dairy => "dairy",
            Self::Aromatic => "aromatic",
            Self::Herb => "herb",
            Self::Spice => "spice",
            Self::Condiment => "condiment",
            Self::Fat => "fat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryItem {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub preparation: Option<String>,
}

/// Known ingredients, indexed by canonical name and alias.
#[derive(Debug, Clone, Default)]
pub struct Pantry {
    items: BTreeMap<String, PantryItem>,
    aliases: BTreeMap<String, String>,
}

/// Input ingredients split by whether the pantry knows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Canonical names, sorted and deduplicated.
    pub known: Vec<String>,
    /// Unrecognized ingredients as the user typed them.
    pub unknown: Vec<String>,
}

impl Pantry {
    #[must_use]
    pub fn new(items: Vec<PantryItem>) -> Self {
        let mut pantry = Self::default();
        for mut item in items {
            item.name = normalize_tag(&item.name);
            for alias in &item.aliases {
                pantry
                    .aliases
                    .insert(normalize_tag(alias), item.name.clone());
            }
            pantry.items.insert(item.name.clone(), item);
        }
        pantry
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Canonical name for a normalized tag, following aliases.
    #[must_use]
    pub fn canonical(&self, tag: &str) -> Option<&str> {
        if let Some((name, _)) = self.items.get_key_value(tag) {
            return Some(name.as_str());
        }
        self.aliases.get(tag).map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&PantryItem> {
        self.canonical(tag).and_then(|name| self.items.get(name))
    }

    #[must_use]
    pub fn is_known(&self, tag: &str) -> bool {
        self.canonical(tag).is_some()
    }

    pub fn items(&self) -> impl Iterator<Item = &PantryItem> {
        self.items.values()
    }

    #[must_use]
    pub fn classify(&self, ingredients: &IngredientSet) -> Classified {
        let mut classified = Classified::default();
        for tag in ingredients.tags() {
            match self.canonical(tag) {
                Some(name) => classified.known.push(name.to_string()),
                None => classified
                    .unknown
                    .push(ingredients.verbatim(tag).unwrap_or(tag).to_string()),
            }
        }
        classified.known.sort();
        classified.known.dedup();
        classified
    }
}
