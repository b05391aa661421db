//! Knowledge base: ingredients, pantry, recipe catalog and rendering.

pub mod catalog;
pub mod ingredients;
pub mod knowledge;
pub mod pantry;
pub mod render;

pub use catalog::{Catalog, CuisineStyle, RecipeTemplate, StepTemplate};
pub use ingredients::{IngredientSet, normalize_tag, parse_ingredients};
pub use knowledge::KnowledgeBase;
pub use pantry::{Category, Classified, Pantry, PantryItem};
pub use render::{IngredientLine, RenderedRecipe, RenderedStep, render};
