//! Error types for chefai.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChefError>;

#[derive(Debug, Error)]
pub enum ChefError {
    /// Malformed or empty user input.
    #[error("invalid input: {0}")]
    Validation(String),

    /// No recipe template shares a required ingredient with the input.
    #[error("no recipe matches [{}]; try different ingredients", ingredients.join(", "))]
    NoMatch { ingredients: Vec<String> },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("knowledge base error: {0}")]
    Catalog(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl ChefError {
    /// Errors the user can fix by retrying with different input.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NoMatch { .. } | Self::Persistence(_)
        )
    }

    /// Stable identifier used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NoMatch { .. } => "no_match",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::Catalog(_) => "catalog",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Wrap a storage-level failure so callers can treat it as non-fatal.
    pub fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("{context}: {err}"))
    }
}
