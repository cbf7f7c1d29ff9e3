use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use blendcraft_crafting::{CraftOutcome, RecipeStatus};
use blendcraft_inventory::Ingredient;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quantity: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Option<u64>,
}

/// Signed restock/consume adjustment. Negative deltas go through the
/// ledger's debit path and are refused rather than driving stock negative.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct RequirementRequest {
    pub ingredient_id: String,
    pub amount_needed: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub requirements: Vec<RequirementRequest>,
}

// -------------------------
// Response shaping
// -------------------------

pub fn ingredient_to_json(ing: &Ingredient) -> JsonValue {
    json!({
        "id": ing.id.to_string(),
        "name": ing.name,
        "category": ing.category,
        "description": ing.description,
        "image_url": ing.image_url,
        "quantity": ing.quantity,
        "created_at": ing.created_at,
        "updated_at": ing.updated_at,
    })
}

pub fn recipe_status_to_json(status: &RecipeStatus) -> JsonValue {
    let requirements: Vec<JsonValue> = status
        .recipe
        .requirements
        .iter()
        .map(|r| {
            json!({
                "ingredient_id": r.ingredient_id.to_string(),
                "amount_needed": r.amount_needed,
            })
        })
        .collect();

    let mut body = json!({
        "id": status.recipe.id.to_string(),
        "name": status.recipe.name,
        "description": status.recipe.description,
        "image_url": status.recipe.image_url,
        "requirements": requirements,
        "produced_count": status.recipe.produced_count,
        "craftable": status.craftable,
        "unmet": status.unmet,
    });
    if let Some(err) = &status.evaluation_error {
        body["evaluation_error"] = json!(err);
    }
    body
}

pub fn craft_outcome_to_json(outcome: &CraftOutcome) -> JsonValue {
    json!({
        "recipe_id": outcome.recipe_id.to_string(),
        "name": outcome.name,
        "produced_count": outcome.produced_count,
    })
}
