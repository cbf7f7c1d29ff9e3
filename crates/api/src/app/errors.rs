use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use blendcraft_core::DomainError;
use blendcraft_crafting::CraftError;

pub fn craft_error_to_response(err: CraftError) -> axum::response::Response {
    match err {
        CraftError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "recipe not found"),
        CraftError::InsufficientStock { unmet } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": "not enough stock to craft this blend",
                "unmet": unmet,
            })),
        )
            .into_response(),
        CraftError::Storage(e) => domain_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
