//! Authentication route handlers.
//!
//! Registration is a two-step OTP round-trip: `register` stages the account
//! and sends a code, `verify-otp` creates it and returns a bearer token. The
//! same `verify-otp` endpoint logs existing users in after `resend-otp`.

use axum::{Json, extract::State};
use greenhouse_core::UserId;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::models::User;
use crate::routes::{ApiJson, ApiPath};
use crate::services::identity::RegistrationRequest;
use crate::services::otp::OtpIssued;
use crate::state::AppState;

// =============================================================================
// Request bodies
// =============================================================================

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// OTP verification data.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub email: String,
    pub otp: String,
}

/// Body of `resend-otp`.
#[derive(Debug, Deserialize)]
pub struct ResendOtpForm {
    pub email: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Body of `PATCH /auth/users/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveForm {
    pub is_active: bool,
}

// =============================================================================
// Responses
// =============================================================================

/// Response to an OTP issuance.
#[derive(Debug, Serialize)]
pub struct OtpSentResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
    /// Only present when the code could not be delivered.
    #[serde(rename = "demoOTP", skip_serializing_if = "Option::is_none")]
    pub demo_otp: Option<String>,
}

impl OtpSentResponse {
    fn new(email: String, issued: OtpIssued) -> Self {
        Self {
            success: true,
            message: issued.message,
            email,
            demo_otp: issued.demo_code,
        }
    }
}

/// Response carrying a freshly issued token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Stage a registration and send the verification code.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<Json<OtpSentResponse>, AppError> {
    let (email, issued) = state
        .identity()
        .register_request(RegistrationRequest {
            name: form.name,
            email: form.email,
            phone: form.phone,
            password: SecretString::from(form.password),
        })
        .await?;

    Ok(Json(OtpSentResponse::new(email.into_inner(), issued)))
}

/// Complete a registration or log in with a code.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<VerifyOtpForm>,
) -> Result<Json<SessionResponse>, AppError> {
    let verified = state
        .identity()
        .verify_otp(&form.email, form.otp.trim())
        .await?;

    let user = verified.user;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(SessionResponse {
        success: true,
        message: if verified.is_new {
            "Registration successful"
        } else {
            "Login successful"
        },
        token: state.identity().issue_token(&user),
        user,
    }))
}

/// Send a new code to an existing account or pending registration.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn resend_otp(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ResendOtpForm>,
) -> Result<Json<OtpSentResponse>, AppError> {
    let (email, issued) = state.identity().request_otp(&form.email).await?;
    Ok(Json(OtpSentResponse::new(email.into_inner(), issued)))
}

/// Log in with email and password.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state
        .identity()
        .password_login(&form.email, &form.password)
        .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(SessionResponse {
        success: true,
        message: "Login successful",
        token: state.identity().issue_token(&user),
        user,
    }))
}

/// Tokens are stateless, so logout only acknowledges.
pub async fn logout() -> Json<MessageResponse> {
    clear_sentry_user();
    Json(MessageResponse {
        success: true,
        message: "Logged out successfully",
    })
}

/// The user behind the bearer token.
pub async fn me(RequireUser(user): RequireUser) -> Json<UserResponse> {
    Json(UserResponse {
        success: true,
        user,
    })
}

/// All users, newest first.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<UsersResponse> {
    Json(UsersResponse {
        success: true,
        users: state.identity().list_users().await,
    })
}

/// Activate or deactivate an account.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn set_active(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(form): ApiJson<SetActiveForm>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.identity().set_active(id, form.is_active).await?;
    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}
