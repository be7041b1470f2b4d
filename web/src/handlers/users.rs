//! User registration and verification endpoints.

use crate::middleware::HandlerError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use studia_identity::{CacheStore, Envelope, MailSender, ResponseCode, UserRepository};

/// Body for `POST /api/v1/users/`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Desired username.
    pub username: String,
    /// Email address to verify.
    pub email: String,
    /// Clear-text password, hashed before persistence.
    pub password: String,
}

/// Body for `POST /api/v1/users/verify-email`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    /// The six-digit OTP from the verification email.
    pub otp: String,
    /// Email address being verified.
    pub email: String,
}

/// `GET /api/v1/users/ping` — liveness probe.
pub async fn ping() -> Response {
    Json(Envelope::success(json!("pong"))).into_response()
}

/// `POST /api/v1/users/` — register a user and send the verification
/// email.
pub async fn create_user<R, C, M>(
    State(state): State<AppState<R, C, M>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let Json(body) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_input(&rejection.body_text()),
    };

    match state
        .service
        .create_user(&body.username, &body.password, &body.email)
        .await
    {
        Ok(registered) => Json(Envelope::success(json!({
            "user_id": registered.user_id,
            "requires_otp": true,
        })))
        .into_response(),
        Err(err) => error_response(ResponseCode::from(&err), &err.to_string()),
    }
}

/// `POST /api/v1/users/verify-email` — redeem an OTP challenge.
pub async fn verify_email<R, C, M>(
    State(state): State<AppState<R, C, M>>,
    payload: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let Json(body) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_input(&rejection.body_text()),
    };

    match state.service.verify_email(&body.otp, &body.email).await {
        Ok(()) => Json(Envelope::success(json!({"verified": true}))).into_response(),
        Err(err) => error_response(ResponseCode::from(&err), &err.to_string()),
    }
}

/// Envelope for a malformed or unparseable body.
fn invalid_input(detail: &str) -> Response {
    error_response(ResponseCode::InvalidInput, detail)
}

/// Error envelope at transport 200, with the detail attached for the
/// completion log (never serialized to the client).
fn error_response(code: ResponseCode, detail: &str) -> Response {
    let mut response = Json(Envelope::error(code)).into_response();
    response
        .extensions_mut()
        .insert(HandlerError(detail.to_string()));
    response
}
