//! One-time password records.

use chrono::{DateTime, Utc};
use greenhouse_core::Email;

/// An issued one-time code bound to an email identity.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub email: Email,
    /// Six ASCII digits.
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Failed verification attempts so far.
    pub attempts: u8,
    pub consumed: bool,
}

impl OtpRecord {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Unconsumed and not yet expired.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now)
    }
}
