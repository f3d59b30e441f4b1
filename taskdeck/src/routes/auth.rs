//! Auth gate and account routes

use crate::app::AppState;
use crate::database::CredentialsRequest;
use crate::error::AppError;
use crate::routes::error::{ApiError, OrApiError};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Caller identity attached to authenticated requests
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Reject requests without a valid `Authorization: Bearer <token>` header
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(ApiError::unauthenticated)?;

    let user_id = state.auth.authenticate(token).map_err(|_| {
        tracing::debug!("Rejected bearer token");
        ApiError::unauthenticated()
    })?;

    req.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(req).await)
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth
        .register(&payload.username, &payload.password)
        .await
        .or_api_error("Error registering user")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match state.auth.login(&payload.username, &payload.password).await {
        Ok(token) => Ok(Json(json!({ "token": token }))),
        Err(AppError::Unauthenticated) => Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
        )),
        Err(e) => Err(ApiError::from_app(e, "Error logging in")),
    }
}
