use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::auth::password::hash_password;
use crate::error::ServiceError;
use crate::users::dto::UpdateUserRequest;
use crate::users::model::User;
use crate::users::store::UserStore;

pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.find_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.users.find_by_username(username).await?)
    }

    pub async fn update(&self, id: i64, changes: UpdateUserRequest) -> Result<User, ServiceError> {
        let mut user = self.get(id).await?;

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = if email.is_empty() { None } else { Some(email) };
        }
        if let Some(phone) = changes.phone {
            user.phone = Some(phone);
        }
        if let Some(real_name) = changes.real_name {
            user.real_name = Some(real_name);
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(status) = changes.status {
            user.status = status;
        }
        // An absent or empty password keeps the stored hash.
        if let Some(password) = changes.password.filter(|p| !p.is_empty()) {
            user.password = hash_password(&password)?;
        }
        user.updated_at = OffsetDateTime::now_utc();

        let updated = self.users.update(&user).await?;
        info!(user_id = updated.id, username = %updated.username, "user updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let user = self.get(id).await?;
        self.users.delete(id).await?;
        info!(user_id = id, username = %user.username, "user deleted");
        Ok(())
    }

    pub async fn toggle_status(&self, id: i64) -> Result<User, ServiceError> {
        let mut user = self.get(id).await?;
        user.status = if user.status == 1 { 0 } else { 1 };
        user.updated_at = OffsetDateTime::now_utc();

        let updated = self.users.update(&user).await?;
        info!(user_id = id, status = updated.status, "user status toggled");
        Ok(updated)
    }
}
