//! Bearer tokens of the form `auth_{userId}_{issuedAtMillis}`.
//!
//! Tokens are unsigned: validity is the format plus a 30-day window from the
//! embedded timestamp. There is no revocation list.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use greenhouse_core::UserId;

const PREFIX: &str = "auth_";

/// How long a token stays valid after issue, in days.
pub const TOKEN_LIFETIME_DAYS: i64 = 30;

/// A decoded bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerToken {
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
}

impl BearerToken {
    #[must_use]
    pub const fn new(user_id: UserId, issued_at: DateTime<Utc>) -> Self {
        Self { user_id, issued_at }
    }

    /// Decode a token string; `None` when it is not in the expected shape.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let (id, millis) = token.strip_prefix(PREFIX)?.split_once('_')?;
        let user_id = id.parse::<UserId>().ok()?;
        let issued_at = DateTime::from_timestamp_millis(millis.parse().ok()?)?;
        Some(Self { user_id, issued_at })
    }

    /// Whether the token is still inside its validity window at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at <= Duration::days(TOKEN_LIFETIME_DAYS)
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{}_{}",
            self.user_id,
            self.issued_at.timestamp_millis()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let issued_at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let token = BearerToken::new(UserId::new(42), issued_at);
        assert_eq!(token.to_string(), "auth_42_1700000000123");
        assert_eq!(BearerToken::parse("auth_42_1700000000123"), Some(token));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(BearerToken::parse("").is_none());
        assert!(BearerToken::parse("auth_42").is_none());
        assert!(BearerToken::parse("auth_x_1700000000123").is_none());
        assert!(BearerToken::parse("token_42_1700000000123").is_none());
        assert!(BearerToken::parse("auth_42_soon").is_none());
    }

    #[test]
    fn test_validity_window_is_thirty_days() {
        let issued_at = Utc::now();
        let token = BearerToken::new(UserId::new(1), issued_at);

        assert!(token.is_valid_at(issued_at + Duration::days(30)));
        assert!(!token.is_valid_at(issued_at + Duration::days(30) + Duration::seconds(1)));
    }
}
