use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blendcraft_core::{DomainError, DomainResult, IngredientId, RecipeId};

/// One line of a recipe: how much of one ingredient a single craft consumes.
///
/// Immutable once the recipe is defined. `amount_needed` is strictly
/// positive; zero-amount lines are rejected at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRequirement {
    pub ingredient_id: IngredientId,
    pub amount_needed: u64,
}

impl RecipeRequirement {
    pub fn new(ingredient_id: IngredientId, amount_needed: u64) -> DomainResult<Self> {
        if amount_needed == 0 {
            return Err(DomainError::validation(
                "requirement amount must be positive",
            ));
        }
        Ok(Self {
            ingredient_id,
            amount_needed,
        })
    }
}

/// A blend: one output produced from a fixed multiset of ingredient
/// requirements.
///
/// The requirement list holds ingredient *identifiers*, not ingredient
/// records; resolution against the stock ledger happens at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub requirements: Vec<RecipeRequirement>,
    pub produced_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Define a new recipe. A recipe with zero requirements is valid (and
    /// trivially always craftable).
    pub fn new(
        id: RecipeId,
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: Option<String>,
        requirements: Vec<RecipeRequirement>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("recipe name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            image_url,
            requirements,
            produced_count: 0,
            created_at: now,
            updated_at: now,
        })
    }
}
