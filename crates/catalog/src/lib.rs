//! `blendcraft-catalog` — blend recipe definitions and their store.
//!
//! A recipe's requirement list is fixed at definition time; only
//! `produced_count` moves afterwards, and only upward.

pub mod recipe;
pub mod store;

pub use recipe::{Recipe, RecipeRequirement};
pub use store::{InMemoryRecipeStore, RecipeStore};
