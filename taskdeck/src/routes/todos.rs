//! Todo routes
//!
//! Handlers run behind `require_auth`; the owner is always the caller.

use crate::app::AppState;
use crate::database::{CreateTodoRequest, Todo, UpdateTodoRequest};
use crate::routes::auth::AuthUser;
use crate::routes::error::{ApiError, OrApiError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

pub async fn list_todos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .todos
        .list(&user.user_id)
        .await
        .or_api_error("Error fetching todos")?;

    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .todos
        .create(&user.user_id, payload.title)
        .await
        .or_api_error("Error creating todo")?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state
        .todos
        .update(&user.user_id, &id, payload.title, payload.completed)
        .await
        .or_api_error("Error updating todo")?;

    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .todos
        .delete(&user.user_id, &id)
        .await
        .or_api_error("Error deleting todo")?;

    Ok(Json(json!({ "message": "Todo deleted successfully" })))
}
