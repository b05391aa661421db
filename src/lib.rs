//! chefai - ingredient-driven recipe suggestions.
//!
//! The [`kitchen`] module holds the knowledge base (pantry and recipe
//! catalog), [`suggestions`] scores templates and tracks skill progression,
//! and [`storage`] persists a session between runs.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod kitchen;
pub mod storage;
pub mod suggestions;
pub mod test_utils;

pub use error::{ChefError, Result};
