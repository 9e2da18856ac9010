//! Index and health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct IndexResponse {
    name: &'static str,
    version: &'static str,
    endpoints: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    cache: &'static str,
}

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "Taskboard API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            "POST /api/users/register",
            "POST /api/users/login",
            "GET /api/users/profile",
            "GET /api/tasks",
            "POST /api/tasks",
            "GET /api/tasks/:id",
            "PUT /api/tasks/:id",
            "DELETE /api/tasks/:id",
        ],
    })
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache: state.cache_backend(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
}
