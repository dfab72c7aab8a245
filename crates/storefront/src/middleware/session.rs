//! Cart session identification.
//!
//! Carts are keyed by a caller-supplied `x-session-id` header. Callers that
//! send none share the `default` cart. The value is an opaque key, not a
//! credential.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::services::cart::DEFAULT_SESSION;

/// The HTTP header carrying the cart session key.
pub const SESSION_HEADER: &str = "x-session-id";

const MAX_SESSION_LEN: usize = 128;

/// Extractor for the cart session key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSession(pub String);

impl<S> FromRequestParts<S> for CartSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && value.len() <= MAX_SESSION_LEN)
            .unwrap_or(DEFAULT_SESSION);

        Ok(Self(session.to_owned()))
    }
}
