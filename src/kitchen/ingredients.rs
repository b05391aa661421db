//! Parsing free-text ingredient lists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ChefError, Result};

/// Normalized set of ingredient tags parsed from user input.
///
/// Tags are NFKC-normalized, lower-cased, trimmed and have inner whitespace
/// collapsed. The first spelling seen for each tag is kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSet {
    entries: BTreeMap<String, String>,
}

impl IngredientSet {
    /// Parse a comma-separated list. Empty tokens are dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for token in text.split(',') {
            let verbatim = token.trim();
            let tag = normalize_tag(verbatim);
            if tag.is_empty() {
                continue;
            }
            entries.entry(tag).or_insert_with(|| verbatim.to_string());
        }
        if entries.is_empty() {
            return Err(ChefError::Validation(
                "enter at least one ingredient, separated by commas".to_string(),
            ));
        }
        Ok(Self { entries })
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
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Normalized tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The spelling the user typed for `tag`, trimmed.
    #[must_use]
    pub fn verbatim(&self, tag: &str) -> Option<&str> {
        self.entries.get(tag).map(String::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Shorthand for [`IngredientSet::parse`].
pub fn parse_ingredients(text: &str) -> Result<IngredientSet> {
    IngredientSet::parse(text)
}

/// Canonical form of a single ingredient token.
#[must_use]
pub fn normalize_tag(raw: &str) -> String {
    let folded: String = raw.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
