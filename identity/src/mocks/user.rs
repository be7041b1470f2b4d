//! Mock user repository for testing.

use crate::error::{IdentityError, Result};
use crate::providers::{AccountStatus, User, UserRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock user repository.
///
/// In-memory storage keyed by user ID, enforcing the same uniqueness
/// constraints on username and email the Postgres schema carries.
#[derive(Debug, Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl MockUserRepository {
    /// Create a new empty mock repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }

    /// Whether the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, User>>> {
        self.users
            .lock()
            .map_err(|_| IdentityError::InternalError("user mutex poisoned".to_string()))
    }
}

impl UserRepository for MockUserRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.lock()?;

        let conflict = users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if conflict {
            return Err(IdentityError::UserAlreadyExists);
        }

        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.lock()?
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(IdentityError::UserNotFound)
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        self.lock()?
            .get(user_id)
            .cloned()
            .ok_or(IdentityError::UserNotFound)
    }

    async fn update_account_status(&self, user_id: &str, status: AccountStatus) -> Result<()> {
        let mut users = self.lock()?;
        let user = users.get_mut(user_id).ok_or(IdentityError::UserNotFound)?;
        user.status = status;
        Ok(())
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let mut users = self.lock()?;
        let user = users.get_mut(user_id).ok_or(IdentityError::UserNotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_verification(
        &self,
        user_id: &str,
        email_verified: bool,
        phone_verified: bool,
    ) -> Result<()> {
        let mut users = self.lock()?;
        let user = users.get_mut(user_id).ok_or(IdentityError::UserNotFound)?;
        user.email_verified = email_verified;
        user.phone_verified = phone_verified;
        Ok(())
    }
}
