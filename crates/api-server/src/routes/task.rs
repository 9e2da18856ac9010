//! Task API endpoints
//!
//! RESTful API for task CRUD operations. Every route requires a bearer token;
//! deletion additionally requires the admin role.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use taskboard_core::task::{TaskInput, TaskQuery, TaskView};

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct DeleteResponse {
    message: &'static str,
}

/// A path segment that is not a UUID cannot name a stored task
fn task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Task not found"))
}

/// GET /api/tasks - List tasks, optionally filtered
async fn list_tasks(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let Query(query) = query?;
    let tasks = state.tasks().get_all(&query).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let Json(input) = body?;
    let task = state.tasks().create(&input).await?;

    tracing::debug!(task_id = %task.id, user_id = %user.id, "Created task");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/:id - Get a single task
async fn get_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskView>> {
    let task = state.tasks().get_by_id(task_id(&id)?).await?;
    Ok(Json(task))
}

/// PUT /api/tasks/:id - Update a task
async fn update_task(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Json<TaskView>> {
    let Json(input) = body?;
    let task = state.tasks().update(task_id(&id)?, &input).await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id - Delete a task (admin only)
async fn delete_task(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = task_id(&id)?;
    state.tasks().delete(id).await?;

    tracing::debug!(task_id = %id, admin_id = %admin.id, "Deleted task");
    Ok(Json(DeleteResponse {
        message: "Task deleted successfully",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
