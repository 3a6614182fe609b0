use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::auth::token::Claims;
use crate::error::ServiceError;
use crate::response::ApiError;
use crate::state::AppState;

/// Extracts and checks the bearer token; handlers receive the parsed claims.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::from(ServiceError::unauthorized("missing Authorization header"))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::from(ServiceError::unauthorized("invalid Authorization header"))
        })?;

        let claims = state.tokens.parse(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::from(ServiceError::unauthorized("invalid or expired token"))
        })?;

        if claims.is_expired() {
            warn!(username = %claims.sub, "token expired");
            return Err(ApiError::from(ServiceError::unauthorized(
                "invalid or expired token",
            )));
        }

        Ok(AuthUser(claims))
    }
}
