//! Identity error types.

use thiserror::Error;

use crate::services::otp::OtpError;

/// Errors that can occur during registration, login and user administration.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] greenhouse_core::EmailError),

    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// An account already exists for this email.
    #[error("User with this email already exists")]
    UserAlreadyExists,

    /// The one-time code was rejected or could not be issued.
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Code verified but there is no account and no live registration.
    #[error("No pending registration for this email. Please register again")]
    NotRegistered,

    /// Login attempted for an email with no account.
    #[error("No account found for this email")]
    UnknownEmail,

    /// User id not found.
    #[error("User not found")]
    UserNotFound,

    /// The account has been deactivated.
    #[error("Account is deactivated. Please contact support")]
    Inactive,

    /// Wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Bearer token missing, malformed, expired, or for an unusable account.
    #[error("Invalid or expired token")]
    InvalidToken,
}
