//! PostgreSQL user repository implementation.
//!
//! Persistent storage for user accounts. The schema carries unique
//! constraints on both `username` and `email`; unique violations map to
//! [`IdentityError::UserAlreadyExists`] so the workflow layer never
//! inspects database error strings.
//!
//! # Example
//!
//! ```no_run
//! use studia_identity::stores::postgres::PostgresUserRepository;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/studia").await?;
//! let repo = PostgresUserRepository::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{IdentityError, Result};
use crate::providers::{AccountStatus, User, UserRepository};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str = "user_id, username, email, password_hash, \
     email_verified, phone_verified, status, created_at, updated_at";

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new PostgreSQL user repository.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                user_id        TEXT PRIMARY KEY,
                username       TEXT NOT NULL UNIQUE,
                email          TEXT NOT NULL UNIQUE,
                password_hash  TEXT NOT NULL,
                email_verified BOOLEAN NOT NULL DEFAULT FALSE,
                phone_verified BOOLEAN NOT NULL DEFAULT FALSE,
                status         SMALLINT NOT NULL DEFAULT 0,
                created_at     TIMESTAMPTZ NOT NULL,
                updated_at     TIMESTAMPTZ NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(format!("schema setup failed: {e}")))?;
        Ok(())
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User> {
        let status_value: i16 = row
            .try_get("status")
            .map_err(|e| IdentityError::DatabaseError(format!("bad status column: {e}")))?;
        let status = AccountStatus::from_value(status_value)
            .ok_or(IdentityError::InvalidStatus)?;

        let get_text = |name: &str| -> Result<String> {
            row.try_get(name)
                .map_err(|e| IdentityError::DatabaseError(format!("bad {name} column: {e}")))
        };
        let get_bool = |name: &str| -> Result<bool> {
            row.try_get(name)
                .map_err(|e| IdentityError::DatabaseError(format!("bad {name} column: {e}")))
        };
        let get_time = |name: &str| -> Result<DateTime<Utc>> {
            row.try_get(name)
                .map_err(|e| IdentityError::DatabaseError(format!("bad {name} column: {e}")))
        };

        Ok(User {
            user_id: get_text("user_id")?,
            username: get_text("username")?,
            email: get_text("email")?,
            password_hash: get_text("password_hash")?,
            email_verified: get_bool("email_verified")?,
            phone_verified: get_bool("phone_verified")?,
            status,
            created_at: get_time("created_at")?,
            updated_at: get_time("updated_at")?,
        })
    }
}

impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO users
                (user_id, username, email, password_hash,
                 email_verified, phone_verified, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.email_verified)
        .bind(user.phone_verified)
        .bind(user.status.value())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return IdentityError::UserAlreadyExists;
                }
            }
            IdentityError::DatabaseError(format!("failed to create user: {e}"))
        })?;

        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(format!("failed to get user: {e}")))?
        .ok_or(IdentityError::UserNotFound)?;

        Self::row_to_user(&row)
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(format!("failed to get user: {e}")))?
        .ok_or(IdentityError::UserNotFound)?;

        Self::row_to_user(&row)
    }

    async fn update_account_status(&self, user_id: &str, status: AccountStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET status = $2, updated_at = $3 WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(status.value())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(format!("failed to update status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound);
        }
        Ok(())
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = $3 WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(format!("failed to update password: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound);
        }
        Ok(())
    }

    async fn update_verification(
        &self,
        user_id: &str,
        email_verified: bool,
        phone_verified: bool,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email_verified = $2, phone_verified = $3, updated_at = $4
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .bind(email_verified)
        .bind(phone_verified)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            IdentityError::DatabaseError(format!("failed to update verification: {e}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    async fn test_repo() -> PostgresUserRepository {
        let pool = PgPool::connect("postgresql://localhost/studia_test")
            .await
            .expect("failed to connect");
        let repo = PostgresUserRepository::new(pool);
        repo.ensure_schema().await.expect("failed to set up schema");
        repo
    }

    fn sample_user(suffix: &str) -> User {
        let now = Utc::now();
        User {
            user_id: format!("user-{suffix}"),
            username: format!("alice-{suffix}"),
            email: format!("alice-{suffix}@example.com"),
            password_hash: "$2b$12$fake".to_string(),
            email_verified: false,
            phone_verified: false,
            status: AccountStatus::Inactive,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn create_and_fetch_round_trip() {
        let repo = test_repo().await;
        let user = sample_user(&uuid::Uuid::new_v4().to_string());

        repo.create_user(&user).await.unwrap();
        let by_email = repo.get_user_by_email(&user.email).await.unwrap();
        assert_eq!(by_email.user_id, user.user_id);

        let by_id = repo.get_user_by_id(&user.user_id).await.unwrap();
        assert_eq!(by_id.email, user.email);
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn duplicate_email_maps_to_conflict() {
        let repo = test_repo().await;
        let suffix = uuid::Uuid::new_v4().to_string();
        let user = sample_user(&suffix);
        repo.create_user(&user).await.unwrap();

        let mut dup = sample_user(&uuid::Uuid::new_v4().to_string());
        dup.email = user.email.clone();
        let err = repo.create_user(&dup).await.unwrap_err();
        assert_eq!(err, IdentityError::UserAlreadyExists);
    }

    #[tokio::test]
    #[ignore] // Requires Postgres running
    async fn updates_against_missing_user_are_not_found() {
        let repo = test_repo().await;
        let err = repo
            .update_account_status("no-such-user", AccountStatus::Active)
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::UserNotFound);
    }
}
