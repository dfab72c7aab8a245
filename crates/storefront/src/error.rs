//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Error bodies are `{"success": false, "message": "..."}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::cart::CartError;
use crate::services::identity::IdentityError;
use crate::services::orders::OrderError;
use crate::services::otp::OtpError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration, login or token failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Order operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Identity(err) => match err {
                IdentityError::Otp(OtpError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
                IdentityError::InvalidToken => StatusCode::UNAUTHORIZED,
                IdentityError::Inactive => StatusCode::FORBIDDEN,
                IdentityError::UserNotFound => StatusCode::NOT_FOUND,
                IdentityError::InvalidEmail(_)
                | IdentityError::Validation(_)
                | IdentityError::UserAlreadyExists
                | IdentityError::Otp(_)
                | IdentityError::NotRegistered
                | IdentityError::UnknownEmail
                | IdentityError::InvalidCredentials => StatusCode::BAD_REQUEST,
            },
            Self::Cart(err) => match err {
                CartError::PlantNotFound(_) | CartError::LineNotFound(_) => StatusCode::NOT_FOUND,
                CartError::InvalidQuantity(_) | CartError::OutOfStock { .. } => {
                    StatusCode::BAD_REQUEST
                }
            },
            Self::Order(err) => match err {
                OrderError::NotFound(_) => StatusCode::NOT_FOUND,
                OrderError::Validation(_) | OrderError::InvalidState { .. } => {
                    StatusCode::BAD_REQUEST
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(IdentityError::InvalidEmail(_)) => "Invalid email address".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a customer action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
