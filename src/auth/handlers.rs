use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::auth::dto::{LoginRequest, LoginResponse, PasswordPreview, RegisterRequest};
use crate::auth::extractor::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ServiceError;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;
use crate::users::model::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state.auth.register(payload).await?;
    let token = state.tokens.issue(&user.username, user.id)?;
    Ok(ApiResponse::success_with(
        "registration successful",
        LoginResponse {
            token,
            username: user.username,
            role: user.role,
            user_id: user.id,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = state.auth.login(payload).await?;
    let token = state.tokens.issue(&user.username, user.id)?;
    Ok(ApiResponse::success_with(
        "login successful",
        LoginResponse {
            token,
            username: user.username,
            role: user.role,
            user_id: user.id,
        },
    ))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .users
        .find_by_username(&claims.sub)
        .await?
        .ok_or_else(|| ServiceError::not_found("user not found"))?;
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize)]
pub struct PasswordToolQuery {
    #[serde(default = "default_password")]
    pub pwd: String,
}

fn default_password() -> String {
    "123456".into()
}

/// Diagnostic endpoint: hash the given password and verify it right back.
#[instrument]
pub async fn password_tool(
    Query(query): Query<PasswordToolQuery>,
) -> Result<Json<ApiResponse<PasswordPreview>>, ApiError> {
    let hash = hash_password(&query.pwd)?;
    let verify = verify_password(&query.pwd, &hash);
    Ok(ApiResponse::success(PasswordPreview {
        password: query.pwd,
        hash,
        verify,
    }))
}

#[cfg(test)]
mod auth_handler_tests {
    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn register_envelope_carries_a_token() {
        let state = test_state();
        let Json(body) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "alice".into(),
                password: "secret".into(),
                email: None,
                phone: None,
                real_name: None,
                role: None,
            }),
        )
        .await
        .expect("register should succeed");

        assert_eq!(body.code, 200);
        assert_eq!(body.message, "registration successful");
        let data = body.data.expect("register data");
        assert!(!data.token.is_empty());
        assert_eq!(data.role, "patient");
        assert!(state.tokens.validate(&data.token, "alice"));
    }

    #[tokio::test]
    async fn me_returns_the_profile_for_a_fresh_token() {
        let state = test_state();
        let Json(registered) = register(
            State(state.clone()),
            Json(RegisterRequest {
                username: "bob".into(),
                password: "secret".into(),
                email: Some("bob@example.com".into()),
                phone: None,
                real_name: None,
                role: None,
            }),
        )
        .await
        .expect("register should succeed");
        let data = registered.data.expect("register data");

        let claims = state.tokens.parse(&data.token).expect("parse issued token");
        let Json(body) = me(State(state), AuthUser(claims))
            .await
            .expect("me should succeed");
        let user = body.data.expect("me data");
        assert_eq!(user.username, "bob");
        assert_eq!(user.email.as_deref(), Some("bob@example.com"));
    }

    #[tokio::test]
    async fn password_tool_verifies_its_own_hash() {
        let Json(body) = password_tool(Query(PasswordToolQuery { pwd: "123456".into() }))
            .await
            .expect("password tool should succeed");
        let preview = body.data.expect("preview data");
        assert_eq!(preview.password, "123456");
        assert!(preview.verify);
        assert_ne!(preview.hash, "123456");
    }
}
