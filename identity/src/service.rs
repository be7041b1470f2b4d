//! User registration and verification workflow.
//!
//! `UserService` orchestrates the relational store, the cache, and the
//! mail sender. Dependencies arrive through the constructor — an
//! explicit container built once at startup, no ambient globals.
//!
//! Registration is intentionally not atomic across store and mail: if
//! the verification email fails to send, the user record stays
//! persisted and the caller receives a mail-specific error. The client
//! can re-trigger verification; no compensating rollback is performed.

use crate::config::OtpConfig;
use crate::error::{IdentityError, Result};
use crate::otp;
use crate::providers::{AccountStatus, CacheStore, MailSender, User, UserRepository};
use chrono::Utc;
use constant_time_eq::constant_time_eq;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    /// Server-generated user ID.
    pub user_id: String,
}

/// Identity workflow service.
///
/// Generic over its three collaborators so tests run against in-memory
/// mocks and production wires Redis, Postgres, and SMTP.
#[derive(Debug, Clone)]
pub struct UserService<R, C, M> {
    users: R,
    cache: C,
    mail: M,
    otp_config: OtpConfig,
}

impl<R, C, M> UserService<R, C, M>
where
    R: UserRepository,
    C: CacheStore,
    M: MailSender,
{
    /// Build the service container.
    pub fn new(users: R, cache: C, mail: M, otp_config: OtpConfig) -> Self {
        Self {
            users,
            cache,
            mail,
            otp_config,
        }
    }

    /// Register a new user and dispatch a verification email.
    ///
    /// Validation short-circuits in order: username, email, password.
    /// The identity value is a fresh UUID v4, treated as globally
    /// unique without a store round-trip. The password is hashed with
    /// bcrypt on a blocking thread before anything is persisted.
    ///
    /// # Errors
    ///
    /// - `InvalidUsername` / `InvalidEmail` / `EmptyPassword` on empty input
    /// - `UserAlreadyExists` if username or email is taken
    /// - `MailSendFailed` if the verification email could not be sent
    ///   (the user record is still persisted)
    /// - `DatabaseError` / `CacheUnavailable` / `InternalError` on
    ///   dependency failure
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<RegisteredUser> {
        if username.is_empty() {
            warn!("rejected registration with empty username");
            return Err(IdentityError::InvalidUsername);
        }
        if email.is_empty() {
            warn!(username = %username, "rejected registration with empty email");
            return Err(IdentityError::InvalidEmail);
        }
        if password.is_empty() {
            warn!(username = %username, "rejected registration with empty password");
            return Err(IdentityError::EmptyPassword);
        }

        let user_id = Uuid::new_v4().to_string();
        let password_hash = hash_password(password).await?;

        let now = Utc::now();
        let user = User {
            user_id: user_id.clone(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            email_verified: false,
            phone_verified: false,
            status: AccountStatus::Inactive,
            created_at: now,
            updated_at: now,
        };

        self.users.create_user(&user).await.map_err(|e| {
            match e {
                IdentityError::UserAlreadyExists => {
                    warn!(username = %username, email = %email, "user already exists");
                }
                ref other => {
                    error!(email = %email, error = %other, "failed to create user");
                }
            }
            e
        })?;

        // Challenge the new address: one live OTP per email, TTL-bounded.
        let code = otp::generate_six_digit_otp();
        self.cache
            .set_with_expiry(&otp::otp_key(email), &code.to_string(), self.otp_config.ttl)
            .await
            .map_err(|e| {
                error!(email = %email, error = %e, "failed to store OTP challenge");
                e
            })?;

        let subject = format!("Studia Verification Code {code}");
        let html_body = format!("<p>{code}</p>");
        match self.mail.send(email, &subject, &html_body).await {
            Ok(message_id) => {
                info!(user_id = %user_id, message_id = %message_id, "created new user");
                Ok(RegisteredUser { user_id })
            }
            Err(e) => {
                // The user record stays; registration is not atomic
                // across store and mail.
                error!(email = %email, error = %e, "failed to send verification email");
                match e {
                    IdentityError::MailSendFailed(_) => Err(e),
                    other => Err(IdentityError::MailSendFailed(other.to_string())),
                }
            }
        }
    }

    /// Verify a user's email address against the stored OTP challenge.
    ///
    /// On match the challenge is consumed and the email-verified flag
    /// flips on; a consumed or expired challenge cannot be replayed.
    ///
    /// # Errors
    ///
    /// - `InvalidOtp` on empty or mismatched OTP
    /// - `InvalidEmail` on empty email
    /// - `UserNotFound` if no user exists for the address
    /// - `OtpExpired` if no live challenge exists for the address
    /// - `DatabaseError` / `CacheUnavailable` on dependency failure
    pub async fn verify_email(&self, otp_code: &str, email: &str) -> Result<()> {
        if otp_code.is_empty() {
            warn!("rejected verification with empty OTP");
            return Err(IdentityError::InvalidOtp);
        }
        if email.is_empty() {
            warn!("rejected verification with empty email");
            return Err(IdentityError::InvalidEmail);
        }

        let user = self.users.get_user_by_email(email).await.map_err(|e| {
            match e {
                IdentityError::UserNotFound => {
                    warn!(email = %email, "verification for unknown user");
                }
                ref other => {
                    error!(email = %email, error = %other, "failed to look up user");
                }
            }
            e
        })?;

        let key = otp::otp_key(email);
        let stored = self.cache.get(&key).await.map_err(|e| {
            error!(email = %email, error = %e, "failed to read OTP challenge");
            e
        })?;

        let Some(stored) = stored else {
            warn!(email = %email, "no live OTP challenge");
            return Err(IdentityError::OtpExpired);
        };

        if !constant_time_eq(stored.as_bytes(), otp_code.as_bytes()) {
            warn!(email = %email, "OTP mismatch");
            return Err(IdentityError::InvalidOtp);
        }

        // Consume before flipping the flag so the challenge cannot be
        // replayed even if the update below fails.
        self.cache.delete(&key).await.map_err(|e| {
            error!(email = %email, error = %e, "failed to consume OTP challenge");
            e
        })?;

        self.users
            .update_verification(&user.user_id, true, user.phone_verified)
            .await?;

        info!(user_id = %user.user_id, "email verification successful");
        Ok(())
    }

    /// Look up a user by email.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if absent, `DatabaseError` on failure.
    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.users.get_user_by_email(email).await
    }

    /// Look up a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if absent, `DatabaseError` on failure.
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        self.users.get_user_by_id(user_id).await
    }

    /// Update a user's account status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` for values outside the known set,
    /// `UserNotFound` / `DatabaseError` from the store.
    pub async fn update_account_status(&self, user_id: &str, status: i16) -> Result<()> {
        let Some(status) = AccountStatus::from_value(status) else {
            warn!(user_id = %user_id, status, "rejected unknown account status");
            return Err(IdentityError::InvalidStatus);
        };

        self.users.update_account_status(user_id, status).await?;
        info!(user_id = %user_id, status = status.value(), "updated account status");
        Ok(())
    }

    /// Update a user's password.
    ///
    /// The new password is re-hashed; cleartext never reaches the store.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPassword` on empty input, `UserNotFound` /
    /// `DatabaseError` from the store.
    pub async fn update_password(&self, user_id: &str, password: &str) -> Result<()> {
        if password.is_empty() {
            warn!(user_id = %user_id, "rejected empty password update");
            return Err(IdentityError::EmptyPassword);
        }

        let password_hash = hash_password(password).await?;
        self.users.update_password(user_id, &password_hash).await?;
        info!(user_id = %user_id, "updated password");
        Ok(())
    }

    /// Update a user's verification flags.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` / `DatabaseError` from the store.
    pub async fn update_verification(
        &self,
        user_id: &str,
        email_verified: bool,
        phone_verified: bool,
    ) -> Result<()> {
        self.users
            .update_verification(user_id, email_verified, phone_verified)
            .await?;
        info!(
            user_id = %user_id,
            email_verified,
            phone_verified,
            "updated verification flags"
        );
        Ok(())
    }
}

/// Hash a password with bcrypt at the default cost.
///
/// Bcrypt is deliberately slow; run it on the blocking pool so request
/// tasks are not stalled.
async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| IdentityError::InternalError(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| IdentityError::InternalError(format!("hashing task failed: {e}")))?
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryCacheStore, MockMailSender, MockUserRepository};

    type TestService = UserService<MockUserRepository, InMemoryCacheStore, MockMailSender>;

    struct Harness {
        service: TestService,
        users: MockUserRepository,
        cache: InMemoryCacheStore,
        mail: MockMailSender,
    }

    fn harness() -> Harness {
        let users = MockUserRepository::new();
        let cache = InMemoryCacheStore::new();
        let mail = MockMailSender::new();
        let service = UserService::new(
            users.clone(),
            cache.clone(),
            mail.clone(),
            OtpConfig::default(),
        );
        Harness {
            service,
            users,
            cache,
            mail,
        }
    }

    /// Pull the OTP out of the recorded verification email.
    fn sent_otp(mail: &MockMailSender) -> String {
        let sent = mail.sent();
        let body = &sent.last().expect("no mail sent").html_body;
        body.trim_start_matches("<p>")
            .trim_end_matches("</p>")
            .to_string()
    }

    #[tokio::test]
    async fn empty_username_is_rejected_before_any_write() {
        let h = harness();
        let err = h
            .service
            .create_user("", "hunter2", "a@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::InvalidUsername);
        assert!(h.users.is_empty());
        assert!(h.mail.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_email_is_rejected() {
        let h = harness();
        let err = h
            .service
            .create_user("alice", "hunter2", "")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::InvalidEmail);
        assert!(h.users.is_empty());
    }

    #[tokio::test]
    async fn empty_password_is_rejected() {
        let h = harness();
        let err = h
            .service
            .create_user("alice", "", "a@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::EmptyPassword);
        assert!(h.users.is_empty());
    }

    #[tokio::test]
    async fn validation_short_circuits_in_field_order() {
        let h = harness();
        // All three fields empty: the username check wins.
        let err = h.service.create_user("", "", "").await.unwrap_err();
        assert_eq!(err, IdentityError::InvalidUsername);
        // Username present, email and password empty: email wins.
        let err = h.service.create_user("alice", "", "").await.unwrap_err();
        assert_eq!(err, IdentityError::InvalidEmail);
    }

    #[tokio::test]
    async fn successful_registration_persists_and_mails() {
        let h = harness();
        let registered = h
            .service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();

        let user = h.users.get_user_by_email("a@example.com").await.unwrap();
        assert_eq!(user.user_id, registered.user_id);
        assert_eq!(user.status, AccountStatus::Inactive);
        assert!(!user.email_verified);

        let sent = h.mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@example.com");
        assert!(sent[0].subject.contains("Verification Code"));
    }

    #[tokio::test]
    async fn cleartext_password_is_never_stored() {
        let h = harness();
        h.service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();

        let user = h.users.get_user_by_email("a@example.com").await.unwrap();
        assert_ne!(user.password_hash, "hunter2");
        assert!(user.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_not_a_generic_failure() {
        let h = harness();
        h.service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();

        let err = h
            .service
            .create_user("bob", "hunter2", "a@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::UserAlreadyExists);
        assert_eq!(h.users.len(), 1);
    }

    #[tokio::test]
    async fn mail_failure_still_leaves_user_persisted() {
        let h = harness();
        h.mail.fail_sends();

        let err = h
            .service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::MailSendFailed(_)));

        // Accepted inconsistency: record exists, no email went out.
        assert!(h.users.get_user_by_email("a@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn correct_otp_verifies_and_cannot_be_replayed() {
        let h = harness();
        h.service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();
        let code = sent_otp(&h.mail);

        h.service.verify_email(&code, "a@example.com").await.unwrap();
        let user = h.users.get_user_by_email("a@example.com").await.unwrap();
        assert!(user.email_verified);

        // The challenge was consumed; the same OTP is now rejected.
        let err = h
            .service
            .verify_email(&code, "a@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::OtpExpired);
    }

    #[tokio::test]
    async fn wrong_otp_is_rejected_and_flag_stays_off() {
        let h = harness();
        h.service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();

        let code = sent_otp(&h.mail);
        let wrong = if code == "100000" { "100001" } else { "100000" };

        let err = h
            .service
            .verify_email(wrong, "a@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::InvalidOtp);

        let user = h.users.get_user_by_email("a@example.com").await.unwrap();
        assert!(!user.email_verified);
    }

    #[tokio::test]
    async fn expired_otp_is_rejected() {
        let h = harness();
        h.service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();
        let code = sent_otp(&h.mail);

        h.cache.expire_now(&otp::otp_key("a@example.com"));

        let err = h
            .service
            .verify_email(&code, "a@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::OtpExpired);
    }

    #[tokio::test]
    async fn verify_rejects_empty_inputs() {
        let h = harness();
        assert_eq!(
            h.service.verify_email("", "a@example.com").await.unwrap_err(),
            IdentityError::InvalidOtp
        );
        assert_eq!(
            h.service.verify_email("123456", "").await.unwrap_err(),
            IdentityError::InvalidEmail
        );
    }

    #[tokio::test]
    async fn verify_unknown_user_is_not_found() {
        let h = harness();
        let err = h
            .service
            .verify_email("123456", "ghost@example.com")
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::UserNotFound);
    }

    #[tokio::test]
    async fn new_registration_overwrites_live_challenge() {
        let h = harness();
        h.service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();
        let first = h.cache.get(&otp::otp_key("a@example.com")).await.unwrap();

        // Same email cannot re-register, but the OTP key semantics are
        // overwrite-on-set: a direct second challenge replaces the first.
        h.cache
            .set_with_expiry(&otp::otp_key("a@example.com"), "000000", chrono::Duration::seconds(60))
            .await
            .unwrap();
        let second = h.cache.get(&otp::otp_key("a@example.com")).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn account_status_validates_before_mutating() {
        let h = harness();
        let registered = h
            .service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();

        let err = h
            .service
            .update_account_status(&registered.user_id, 7)
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::InvalidStatus);

        h.service
            .update_account_status(&registered.user_id, 1)
            .await
            .unwrap();
        let user = h.users.get_user_by_id(&registered.user_id).await.unwrap();
        assert_eq!(user.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn password_update_rejects_empty_and_rehashes() {
        let h = harness();
        let registered = h
            .service
            .create_user("alice", "hunter2", "a@example.com")
            .await
            .unwrap();

        assert_eq!(
            h.service
                .update_password(&registered.user_id, "")
                .await
                .unwrap_err(),
            IdentityError::EmptyPassword
        );

        let before = h.users.get_user_by_id(&registered.user_id).await.unwrap();
        h.service
            .update_password(&registered.user_id, "correct horse")
            .await
            .unwrap();
        let after = h.users.get_user_by_id(&registered.user_id).await.unwrap();
        assert_ne!(before.password_hash, after.password_hash);
        assert_ne!(after.password_hash, "correct horse");
    }
}
