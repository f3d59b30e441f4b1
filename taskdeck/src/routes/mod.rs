//! HTTP routes
//!
//! `/api/auth/*` is public; `/api/todos` sits behind the auth gate.

pub mod auth;
pub mod error;
pub mod todos;

pub use auth::{require_auth, AuthUser};
pub use error::ApiError;

use crate::app::AppState;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Assemble the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let todos = Router::new()
        .route("/api/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/api/todos/{id}",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(todos)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
