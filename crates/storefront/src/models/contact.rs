//! Contact form submissions.

use greenhouse_core::Email;
use serde::Serialize;

/// A validated message from the contact form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}
