//! Recipe templates and cuisine styles.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChefError, Result};

use super::ingredients::normalize_tag;
use super::pantry::Pantry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuisineStyle {
    American,
    Italian,
    Mexican,
    Asian,
    Mediterranean,
    Indian,
    French,
    Homestyle,
}

impl CuisineStyle {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::American,
            Self::Italian,
            Self::Mexican,
            Self::Asian,
            Self::Mediterranean,
            Self::Indian,
            Self::French,
            Self::Homestyle,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::American => "american",
            Self::Italian => "italian",
            Self::Mexican => "mexican",
            Self::Asian => "asian",
            Self::Mediterranean => "mediterranean",
            Self::Indian => "indian",
            Self::French => "french",
            Self::Homestyle => "homestyle",
        }
    }
}

impl fmt::Display for CuisineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CuisineStyle {
    type Err = ChefError;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = normalize_tag(value);
        Self::all()
            .iter()
            .copied()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| {
                ChefError::Config(format!(
                    "unknown cuisine {value} (expected one of {})",
                    Self::all()
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join("|")
                ))
            })
    }
}

/// One instruction in a template, with `{required}`, `{extras}` and `{all}`
/// placeholders filled in at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    pub text: String,
    /// Inclusive minute range, `[min, max]`.
    pub minutes: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTemplate {
    pub id: u32,
    pub name: String,
    pub cuisine: CuisineStyle,
    pub required: BTreeSet<String>,
    #[serde(default)]
    pub optional: BTreeSet<String>,
    pub difficulty: u8,
    #[serde(rename = "step", alias = "steps", default)]
    pub steps: Vec<StepTemplate>,
    #[serde(default)]
    pub sides: Vec<String>,
}

impl RecipeTemplate {
    /// Required tags present in `known`.
    #[must_use]
    pub fn required_overlap(&self, known: &BTreeSet<String>) -> usize {
        self.required.intersection(known).count()
    }
}

/// Immutable, id-ordered set of recipe templates.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<RecipeTemplate>,
}

impl Catalog {
    /// Build a catalog, normalizing tags and checking them against `pantry`.
    pub fn new(templates: Vec<RecipeTemplate>, pantry: &Pantry) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(templates.len());
        for mut template in templates {
            if !seen.insert(template.id) {
                return Err(ChefError::Catalog(format!(
                    "duplicate recipe id {}",
                    template.id
                )));
            }
            if template.required.is_empty() {
                return Err(ChefError::Catalog(format!(
                    "recipe {} ({}) has no required ingredients",
                    template.id, template.name
                )));
            }
            if !(1..=5).contains(&template.difficulty) {
                return Err(ChefError::Catalog(format!(
                    "recipe {} difficulty {} outside 1..=5",
                    template.id, template.difficulty
                )));
            }
            if let Some(step) = template.steps.iter().find(|s| s.minutes[0] > s.minutes[1]) {
                return Err(ChefError::Catalog(format!(
                    "recipe {} step \"{}\" has an inverted minute range",
                    template.id, step.text
                )));
            }
            template.required = canonical_tags(&template.required, template.id, pantry)?;
            template.optional = canonical_tags(&template.optional, template.id, pantry)?;
            normalized.push(template);
        }
        normalized.sort_by_key(|t| t.id);
        Ok(Self {
            templates: normalized,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &RecipeTemplate> {
        self.templates.iter()
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&RecipeTemplate> {
        self.templates
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|idx| &self.templates[idx])
    }
}

fn canonical_tags(tags: &BTreeSet<String>, id: u32, pantry: &Pantry) -> Result<BTreeSet<String>> {
    tags.iter()
        .map(|tag| {
            let tag = normalize_tag(tag);
            pantry.canonical(&tag).map(str::to_string).ok_or_else(|| {
                ChefError::Catalog(format!(
                    "recipe {id} uses ingredient \"{tag}\" that is not in the pantry"
                ))
            })
        })
        .collect()
}
