use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::password::{hash_password, verify_password};
use crate::error::ServiceError;
use crate::users::model::{NewUser, User};
use crate::users::store::UserStore;

pub struct AuthService {
    users: Arc<dyn UserStore>,
}

/// Self-service registration can only produce `patient` or `doctor` accounts.
fn clamp_role(requested: Option<&str>) -> &'static str {
    match requested {
        Some("doctor") => "doctor",
        _ => "patient",
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, ServiceError> {
        if req.username.trim().is_empty() {
            return Err(ServiceError::validation("username must not be empty"));
        }
        if req.password.trim().is_empty() {
            return Err(ServiceError::validation("password must not be empty"));
        }

        if self.users.find_by_username(&req.username).await?.is_some() {
            warn!(username = %req.username, "registration username taken");
            return Err(ServiceError::duplicate("username already exists"));
        }

        // Absent and empty email are the same thing; uniqueness only applies
        // when one is actually present.
        let email = req.email.filter(|e| !e.is_empty());
        if let Some(email) = &email {
            if self.users.find_by_email(email).await?.is_some() {
                warn!(email = %email, "registration email taken");
                return Err(ServiceError::duplicate("email already registered"));
            }
        }

        let now = OffsetDateTime::now_utc();
        let user = self
            .users
            .insert(NewUser {
                username: req.username,
                password: hash_password(&req.password)?,
                email,
                phone: req.phone,
                real_name: req.real_name,
                role: clamp_role(req.role.as_deref()).to_string(),
                status: 1,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<User, ServiceError> {
        // Field-specific messages; only an actual mismatch gets the blended one.
        if req.username.trim().is_empty() {
            return Err(ServiceError::validation("username must not be empty"));
        }
        if req.password.trim().is_empty() {
            return Err(ServiceError::validation("password must not be empty"));
        }

        let user = match self.users.find_by_username(&req.username).await? {
            Some(user) => user,
            None => {
                warn!(username = %req.username, "login unknown username");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !verify_password(&req.password, &user.password) {
            warn!(username = %req.username, user_id = user.id, "login invalid password");
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.is_enabled() {
            warn!(username = %req.username, user_id = user.id, "login on disabled account");
            return Err(ServiceError::AccountDisabled);
        }

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok(user)
    }
}
