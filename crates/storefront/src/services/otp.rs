//! One-time code issuance and verification.
//!
//! Codes are bound to an email identity. At most one live code exists per
//! identity; asking again while it is live is rate-limited instead of
//! rotating the code. A code is deleted when it is used, when it is found
//! expired, or once its attempt budget is spent.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::Duration;
use greenhouse_core::Email;
use rand::Rng;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::clock::SharedClock;
use crate::models::OtpRecord;
use crate::services::notifier::{Notification, SharedNotifier, deliver};

/// Errors from issuing or verifying a code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    /// A live code was already issued for this identity.
    #[error("An OTP was already sent. Please wait {minutes} minute(s) before requesting a new one")]
    RateLimited { minutes: i64 },

    #[error("No OTP found for this email. Please request a new one")]
    NotFound,

    #[error("OTP has expired. Please request a new one")]
    Expired,

    #[error("Too many failed attempts. Please request a new OTP")]
    AttemptsExhausted,

    #[error("Invalid OTP. {remaining} attempt(s) remaining")]
    InvalidCode { remaining: u8 },
}

/// Tunables for the registry.
#[derive(Debug, Clone)]
pub struct OtpSettings {
    /// Lifetime of an issued code.
    pub ttl: Duration,
    /// Failed verifications allowed before the code is discarded.
    pub max_attempts: u8,
    /// Return the code to the caller when it cannot be delivered.
    pub expose_on_delivery_failure: bool,
    /// Bound on the notifier call.
    pub dispatch_timeout: std::time::Duration,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            max_attempts: 3,
            expose_on_delivery_failure: true,
            dispatch_timeout: std::time::Duration::from_secs(5),
        }
    }
}

/// Outcome of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpIssued {
    pub message: String,
    /// The code itself, present only when delivery failed and exposure is on.
    pub demo_code: Option<String>,
}

/// In-memory store of issued codes.
pub struct OtpRegistry {
    records: Mutex<HashMap<Email, OtpRecord>>,
    clock: SharedClock,
    notifier: SharedNotifier,
    settings: OtpSettings,
}

impl OtpRegistry {
    #[must_use]
    pub fn new(clock: SharedClock, notifier: SharedNotifier, settings: OtpSettings) -> Self {
        Self {
            records: Mutex::default(),
            clock,
            notifier,
            settings,
        }
    }

    /// Issue a fresh code for `email` and dispatch it.
    ///
    /// Delivery failure never fails this call; the code is handed back in
    /// `demo_code` instead when exposure is enabled.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::RateLimited` while a previous code is still live
    /// and has attempts left.
    #[tracing::instrument(skip(self), fields(email = %email))]
    pub async fn issue(&self, email: &Email) -> Result<OtpIssued, OtpError> {
        let now = self.clock.now();
        let code = generate_code();

        {
            let mut records = self.records.lock().await;
            let live = records.get(email).filter(|existing| {
                existing.is_live(now) && existing.attempts < self.settings.max_attempts
            });
            if let Some(existing) = live {
                let remaining = (existing.expires_at - now).num_seconds().max(1);
                return Err(OtpError::RateLimited {
                    minutes: (remaining + 59) / 60,
                });
            }

            records.insert(
                email.clone(),
                OtpRecord {
                    email: email.clone(),
                    code: code.clone(),
                    issued_at: now,
                    expires_at: now + self.settings.ttl,
                    attempts: 0,
                    consumed: false,
                },
            );
        }

        let notification = Notification::OtpCode {
            to: email.clone(),
            code: code.clone(),
            expires_in_minutes: self.settings.ttl.num_minutes(),
        };

        match deliver(
            self.notifier.as_ref(),
            &notification,
            self.settings.dispatch_timeout,
        )
        .await
        {
            Ok(()) => {
                tracing::info!("OTP sent");
                Ok(OtpIssued {
                    message: format!("OTP sent to {email}"),
                    demo_code: None,
                })
            }
            Err(e) if self.settings.expose_on_delivery_failure => {
                tracing::warn!(error = %e, "OTP delivery failed, returning code in response");
                Ok(OtpIssued {
                    message: "Email delivery is unavailable. Use the code provided to continue"
                        .to_owned(),
                    demo_code: Some(code),
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "OTP delivery failed");
                Ok(OtpIssued {
                    message: format!("OTP sent to {email}"),
                    demo_code: None,
                })
            }
        }
    }

    /// Check `code` against the live record for `email`.
    ///
    /// A successful check consumes the code; verifying it again reports
    /// `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Expired`, `AttemptsExhausted` or `InvalidCode`.
    #[tracing::instrument(skip(self, code), fields(email = %email))]
    pub async fn verify(&self, email: &Email, code: &str) -> Result<(), OtpError> {
        let now = self.clock.now();
        let mut records = self.records.lock().await;

        let Entry::Occupied(mut entry) = records.entry(email.clone()) else {
            return Err(OtpError::NotFound);
        };

        let record = entry.get_mut();
        if record.is_expired(now) {
            entry.remove();
            return Err(OtpError::Expired);
        }
        if record.attempts >= self.settings.max_attempts {
            entry.remove();
            return Err(OtpError::AttemptsExhausted);
        }
        if record.code != code.trim() {
            record.attempts += 1;
            let remaining = self.settings.max_attempts - record.attempts;
            tracing::debug!(remaining, "OTP mismatch");
            return Err(OtpError::InvalidCode { remaining });
        }

        entry.remove();
        tracing::info!("OTP verified");
        Ok(())
    }

    /// Whether an unexpired code is outstanding for `email`.
    pub async fn has_live(&self, email: &Email) -> bool {
        let now = self.clock.now();
        self.records
            .lock()
            .await
            .get(email)
            .is_some_and(|record| record.is_live(now))
    }
}

/// Generate a 6-digit code in `100000..=999999`.
#[must_use]
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}
