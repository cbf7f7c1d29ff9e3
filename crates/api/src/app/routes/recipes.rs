use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use blendcraft_catalog::{Recipe, RecipeRequirement, RecipeStore};
use blendcraft_core::{IngredientId, RecipeId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/:id", get(get_recipe).delete(delete_recipe))
        .route("/:id/craft", post(craft_recipe))
}

/// Every defined recipe with its advisory `craftable` flag and unmet
/// ingredient list.
pub async fn list_recipes(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.crafting().list_with_craftability() {
        Ok(listing) => {
            let body: Vec<_> = listing
                .iter()
                .map(dto::recipe_status_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateRecipeRequest>,
) -> axum::response::Response {
    let mut requirements = Vec::with_capacity(body.requirements.len());
    for req in body.requirements {
        let ingredient_id: IngredientId = match req.ingredient_id.parse() {
            Ok(v) => v,
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    format!("invalid ingredient id: {}", req.ingredient_id),
                )
            }
        };
        match RecipeRequirement::new(ingredient_id, req.amount_needed) {
            Ok(r) => requirements.push(r),
            Err(e) => return errors::domain_error_to_response(e),
        }
    }

    let recipe = match Recipe::new(
        RecipeId::new(),
        body.name,
        body.description,
        body.image_url,
        requirements,
        Utc::now(),
    ) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let recipe_id = recipe.id;
    if let Err(e) = services.recipes().upsert(recipe) {
        return errors::domain_error_to_response(e);
    }

    let status = match services.crafting().status(&recipe_id) {
        Ok(Some(s)) => s,
        // Deleted between upsert and status read.
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "recipe not found")
        }
        Err(e) => return errors::domain_error_to_response(e),
    };

    (StatusCode::CREATED, Json(dto::recipe_status_to_json(&status))).into_response()
}

pub async fn get_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RecipeId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid recipe id"),
    };

    match services.crafting().status(&id) {
        Ok(Some(status)) => {
            (StatusCode::OK, Json(dto::recipe_status_to_json(&status))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "recipe not found"),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Craft one unit: atomic check-and-debit plus produced-count increment.
pub async fn craft_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RecipeId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid recipe id"),
    };

    match services.crafting().craft(&id) {
        Ok(outcome) => {
            (StatusCode::OK, Json(dto::craft_outcome_to_json(&outcome))).into_response()
        }
        Err(e) => errors::craft_error_to_response(e),
    }
}

pub async fn delete_recipe(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: RecipeId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid recipe id"),
    };

    match services.recipes().remove(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "recipe not found"),
        Err(e) => errors::domain_error_to_response(e),
    }
}
