//! Contact form route handlers.
//!
//! Submissions go to the shop inbox and the sender gets an acknowledgement.
//! Both are best-effort; once the form validates the response is a success.

use axum::{Json, extract::State};
use greenhouse_core::Email;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::models::ContactMessage;
use crate::routes::ApiJson;
use crate::services::notifier::{Notification, deliver_best_effort};
use crate::state::AppState;

const DEFAULT_SUBJECT: &str = "General inquiry";

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    fn validate(self) -> Result<ContactMessage, AppError> {
        let email = Email::parse(&self.email)
            .map_err(|_| AppError::BadRequest("Please enter a valid email address.".to_owned()))?;

        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() || message.is_empty() {
            return Err(AppError::BadRequest(
                "Name and message are required.".to_owned(),
            ));
        }

        Ok(ContactMessage {
            name: name.to_owned(),
            email,
            phone: non_empty(self.phone),
            subject: non_empty(self.subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_owned()),
            message: message.to_owned(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Submit the contact form.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<Json<ContactResponse>, AppError> {
    let message = form.validate()?;
    let notifier = state.notifier().as_ref();
    let timeout = state.config().side_effect_timeout;

    let to_shop = async {
        match state.config().admin_notify_email.clone() {
            Some(to) => {
                deliver_best_effort(
                    notifier,
                    &Notification::ContactMessage {
                        to,
                        message: message.clone(),
                    },
                    timeout,
                )
                .await;
            }
            None => tracing::warn!("ADMIN_NOTIFY_EMAIL not set, contact message only logged"),
        }
    };
    let acknowledgement = Notification::ContactAcknowledgement {
        message: message.clone(),
    };
    let to_sender = deliver_best_effort(notifier, &acknowledgement, timeout);
    tokio::join!(to_shop, to_sender);

    tracing::info!(subject = %message.subject, "Contact message received");
    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for contacting us. We'll get back to you soon.",
    }))
}
