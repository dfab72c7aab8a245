//! User domain types.

use chrono::{DateTime, Utc};
use greenhouse_core::{Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// A storefront user.
///
/// The password is an opaque secret compared by plain equality; it is never
/// serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password: SecretString,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Compare a presented password with the stored secret.
    #[must_use]
    pub fn password_matches(&self, presented: &str) -> bool {
        self.password.expose_secret() == presented
    }
}

/// Registration details held while the OTP round-trip is in flight.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub email: Email,
    pub name: String,
    pub phone: String,
    pub password: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl PendingRegistration {
    /// An expired registration is treated as absent.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
