use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use blendcraft_core::IngredientId;
use blendcraft_inventory::{Ingredient, StockLedger};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_ingredients).post(create_ingredient))
        .route(
            "/:id",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
        .route("/:id/adjust", post(adjust_stock))
}

pub async fn list_ingredients(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.ledger().list() {
        Ok(all) => {
            let body: Vec<_> = all.iter().map(dto::ingredient_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateIngredientRequest>,
) -> axum::response::Response {
    let ingredient = match Ingredient::new(
        IngredientId::new(),
        body.name,
        body.category,
        body.description,
        body.image_url,
        body.quantity,
        Utc::now(),
    ) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.ledger().upsert(ingredient.clone()) {
        return errors::domain_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::ingredient_to_json(&ingredient))).into_response()
}

pub async fn get_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: IngredientId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id"),
    };

    match services.ledger().get(&id) {
        Ok(Some(ing)) => (StatusCode::OK, Json(dto::ingredient_to_json(&ing))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateIngredientRequest>,
) -> axum::response::Response {
    let id: IngredientId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id"),
    };

    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "ingredient name cannot be empty",
            );
        }
    }

    // Patch in place under the ledger's write lock. Writing back a whole
    // record from an earlier read would let a stale quantity erase a debit
    // committed in between.
    let mut updated: Option<Ingredient> = None;
    let found = services.ledger().update(&id, &mut |ing| {
        if let Some(name) = &body.name {
            ing.name = name.clone();
        }
        if let Some(category) = &body.category {
            ing.category = category.clone();
        }
        if let Some(description) = &body.description {
            ing.description = description.clone();
        }
        if let Some(image_url) = &body.image_url {
            ing.image_url = Some(image_url.clone());
        }
        if let Some(quantity) = body.quantity {
            ing.quantity = quantity;
        }
        ing.updated_at = Utc::now();
        updated = Some(ing.clone());
    });

    match (found, updated) {
        (Ok(true), Some(ing)) => {
            (StatusCode::OK, Json(dto::ingredient_to_json(&ing))).into_response()
        }
        (Ok(_), _) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
        (Err(e), _) => errors::domain_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let id: IngredientId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id"),
    };

    match services.ledger().get(&id) {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
        Err(e) => return errors::domain_error_to_response(e),
    }

    let result = if body.delta >= 0 {
        services.ledger().credit(&id, body.delta as u64)
    } else {
        match services.ledger().try_debit(&id, body.delta.unsigned_abs()) {
            Ok(true) => Ok(()),
            Ok(false) => {
                return errors::json_error(
                    StatusCode::CONFLICT,
                    "insufficient_stock",
                    "adjustment would drive stock negative",
                )
            }
            Err(e) => Err(e),
        }
    };
    if let Err(e) = result {
        return errors::domain_error_to_response(e);
    }

    match services.ledger().get(&id) {
        Ok(Some(ing)) => (StatusCode::OK, Json(dto::ingredient_to_json(&ing))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_ingredient(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: IngredientId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid ingredient id"),
    };

    match services.ledger().remove(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "ingredient not found"),
        Err(e) => errors::domain_error_to_response(e),
    }
}
