//! Outbound customer and shop notifications.
//!
//! Notifications are never part of a request's success path: callers go
//! through [`deliver`] (bounded by a timeout, outcome returned for callers
//! that need a fallback) or [`deliver_best_effort`] (outcome only logged).

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use greenhouse_core::Email;
use thiserror::Error;

use crate::models::{ContactMessage, Order};
use crate::services::email::EmailError;

/// A message the shop sends.
#[derive(Debug, Clone)]
pub enum Notification {
    /// One-time login/registration code.
    OtpCode {
        to: Email,
        code: String,
        expires_in_minutes: i64,
    },
    /// Sent once a registration completes.
    Welcome { to: Email, name: String },
    /// Order receipt for the customer.
    OrderConfirmation { order: Box<Order> },
    /// New paid order, for the shop inbox.
    NewOrderAlert { to: Email, order: Box<Order> },
    /// Contact form submission, for the shop inbox.
    ContactMessage { to: Email, message: ContactMessage },
    /// Receipt for whoever filled in the contact form.
    ContactAcknowledgement { message: ContactMessage },
}

impl Notification {
    /// Address the message goes to.
    #[must_use]
    pub const fn recipient(&self) -> &Email {
        match self {
            Self::OtpCode { to, .. }
            | Self::Welcome { to, .. }
            | Self::NewOrderAlert { to, .. }
            | Self::ContactMessage { to, .. } => to,
            Self::OrderConfirmation { order } => &order.customer_info.email,
            Self::ContactAcknowledgement { message } => &message.email,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OtpCode { .. } => "otp_code",
            Self::Welcome { .. } => "welcome",
            Self::OrderConfirmation { .. } => "order_confirmation",
            Self::NewOrderAlert { .. } => "new_order_alert",
            Self::ContactMessage { .. } => "contact_message",
            Self::ContactAcknowledgement { .. } => "contact_acknowledgement",
        }
    }
}

/// Errors a notifier can report. All of them mean "not delivered".
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No delivery channel is configured or it did not answer in time.
    #[error("notifier unavailable: {0}")]
    Unavailable(String),

    /// The email transport rejected the message.
    #[error("email delivery failed: {0}")]
    Email(#[from] EmailError),
}

/// Delivery channel for [`Notification`]s.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Shared notifier handle used by the services.
pub type SharedNotifier = Arc<dyn Notifier>;

/// Send a notification, giving up after `timeout`.
///
/// # Errors
///
/// Returns the notifier's error, or `NotifyError::Unavailable` on timeout.
pub async fn deliver(
    notifier: &dyn Notifier,
    notification: &Notification,
    timeout: Duration,
) -> Result<(), NotifyError> {
    match tokio::time::timeout(timeout, notifier.send(notification)).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Unavailable(format!(
            "no response within {}s",
            timeout.as_secs()
        ))),
    }
}

/// Send a notification and log, rather than return, any failure.
pub async fn deliver_best_effort(
    notifier: &dyn Notifier,
    notification: &Notification,
    timeout: Duration,
) {
    if let Err(e) = deliver(notifier, notification, timeout).await {
        tracing::warn!(
            kind = notification.kind(),
            to = %notification.recipient(),
            error = %e,
            "Notification not delivered"
        );
    }
}

/// Notifier used when SMTP is not configured.
///
/// Logs the message and reports `Unavailable`, so OTP issuance falls back to
/// returning the code in the response when that is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            kind = notification.kind(),
            to = %notification.recipient(),
            "Email not configured - notification logged only"
        );
        Err(NotifyError::Unavailable(
            "email delivery is not configured".to_owned(),
        ))
    }
}

/// Notifier that keeps every message in memory.
///
/// Used by tests to read OTP codes and assert on what would have been sent;
/// `failing()` builds one that records and then reports `Unavailable`.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    /// Everything sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent OTP code sent to `email`.
    #[must_use]
    pub fn last_code_for(&self, email: &Email) -> Option<String> {
        self.sent().into_iter().rev().find_map(|n| match n {
            Notification::OtpCode { to, code, .. } if &to == email => Some(code),
            _ => None,
        })
    }

    /// Number of notifications of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.sent().iter().filter(|n| n.kind() == kind).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());

        if self.fail {
            return Err(NotifyError::Unavailable("recording notifier set to fail".to_owned()));
        }
        Ok(())
    }
}
