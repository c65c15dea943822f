//! # User Service
//!
//! Account administration. Listing, editing and deleting other accounts is
//! reserved for admins; the backend enforces that, the CLI only hides it.

use farsh_core::validation::{validate_email, validate_password, validate_username};
use farsh_core::User;
use tracing::info;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::wire::{NewUser, UserUpdate};

#[derive(Debug, Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        UserService { api }
    }

    /// The logged-in operator's own profile.
    pub async fn me(&self) -> ClientResult<User> {
        self.api.get("auth/me", &Vec::new()).await
    }

    pub async fn list(&self) -> ClientResult<Vec<User>> {
        self.api.get("users/", &Vec::new()).await
    }

    pub async fn register(&self, user: &NewUser) -> ClientResult<User> {
        validate_username(&user.username)?;
        validate_email(&user.email)?;
        validate_password(&user.password)?;
        let created: User = self.api.post("auth/register", user).await?;
        info!(user_id = created.id, username = %created.username, role = %created.role, "User registered");
        Ok(created)
    }

    pub async fn update(&self, id: i64, update: &UserUpdate) -> ClientResult<User> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        if let Some(password) = &update.password {
            validate_password(password)?;
        }
        let updated: User = self.api.put(&format!("users/{}", id), update).await?;
        info!(user_id = id, "User updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.api.delete(&format!("users/{}", id)).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
