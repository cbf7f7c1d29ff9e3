use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::get, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the application with freshly constructed in-memory stores.
pub fn build_app() -> Router {
    build_app_with(Arc::new(AppServices::new()))
}

/// Build the application around an existing service handle (tests inject
/// pre-seeded stores this way).
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/ingredients", routes::ingredients::router())
        .nest("/recipes", routes::recipes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

async fn health() -> axum::response::Response {
    (
        axum::http::StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
        .into_response()
}
