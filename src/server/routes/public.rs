use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;

pub(super) fn routes() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "foodbot is up"
    }))
}
