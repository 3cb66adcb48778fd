use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::AppState;
use crate::controllers::RootController;

pub async fn root_route(State(state): State<AppState>) -> impl IntoResponse {
    RootController::root(&state.backend_url).await
}

pub async fn health_check_route() -> impl IntoResponse {
    RootController::health_check().await
}

/// Fallback for paths no route matches.
pub async fn not_found_route() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({"error": "Not Found"})))
}
