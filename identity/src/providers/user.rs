//! User repository trait.

use super::{AccountStatus, User};
use crate::error::Result;
use std::future::Future;

/// User repository.
///
/// This trait abstracts over the relational user store (PostgreSQL).
/// Username and email carry unique constraints; violations surface as
/// `IdentityError::UserAlreadyExists` so callers can distinguish a
/// conflict from a generic failure.
pub trait UserRepository: Send + Sync {
    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Username or email already exists → `IdentityError::UserAlreadyExists`
    /// - Database query fails → `IdentityError::DatabaseError`
    fn create_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send;

    /// Get user by email.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `IdentityError::UserNotFound`
    /// - Database query fails → `IdentityError::DatabaseError`
    fn get_user_by_email(&self, email: &str) -> impl Future<Output = Result<User>> + Send;

    /// Get user by ID.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `IdentityError::UserNotFound`
    /// - Database query fails → `IdentityError::DatabaseError`
    fn get_user_by_id(&self, user_id: &str) -> impl Future<Output = Result<User>> + Send;

    /// Update account status.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `IdentityError::UserNotFound`
    /// - Database query fails → `IdentityError::DatabaseError`
    fn update_account_status(
        &self,
        user_id: &str,
        status: AccountStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Update the stored password hash.
    ///
    /// Callers hash before calling; cleartext never reaches the store.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `IdentityError::UserNotFound`
    /// - Database query fails → `IdentityError::DatabaseError`
    fn update_password(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Update the email/phone verification flags.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `IdentityError::UserNotFound`
    /// - Database query fails → `IdentityError::DatabaseError`
    fn update_verification(
        &self,
        user_id: &str,
        email_verified: bool,
        phone_verified: bool,
    ) -> impl Future<Output = Result<()>> + Send;
}
