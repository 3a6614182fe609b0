use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::RegisterRequest;
use crate::error::ServiceError;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;
use crate::users::dto::{CreateUserRequest, UpdateUserRequest};
use crate::users::model::User;

// None of these routes require a token; the administrative surface is open.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/list", get(list_users))
        .route("/users", post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/toggle-status", put(toggle_user_status))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.users.list().await?;
    Ok(ApiResponse::success(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.get(id).await?;
    Ok(ApiResponse::success(user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServiceError::validation("password must not be empty"))?;

    let user = state
        .auth
        .register(RegisterRequest {
            username: payload.username,
            password,
            email: payload.email,
            phone: payload.phone,
            real_name: payload.real_name,
            role: payload.role,
        })
        .await?;
    Ok(ApiResponse::success_with("user created", user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.update(id, payload).await?;
    Ok(ApiResponse::success_with("user updated", user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.users.delete(id).await?;
    Ok(ApiResponse::success_with("user deleted", ()))
}

#[instrument(skip(state))]
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users.toggle_status(id).await?;
    Ok(ApiResponse::success_with("user status toggled", user))
}
