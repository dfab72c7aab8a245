//! SMTP delivery of shop notifications.
//!
//! Uses lettre for transport with Askama templates for the HTML and plain
//! text bodies.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::{ContactMessage, Order};
use crate::services::notifier::{Notification, Notifier, NotifyError};

#[derive(Template)]
#[template(path = "email/otp_code.html")]
struct OtpCodeHtml<'a> {
    code: &'a str,
    minutes: i64,
}

#[derive(Template)]
#[template(path = "email/otp_code.txt")]
struct OtpCodeText<'a> {
    code: &'a str,
    minutes: i64,
}

#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeHtml<'a> {
    name: &'a str,
}

#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeText<'a> {
    name: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order: &'a Order,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order: &'a Order,
}

#[derive(Template)]
#[template(path = "email/new_order_alert.html")]
struct NewOrderAlertHtml<'a> {
    order: &'a Order,
}

#[derive(Template)]
#[template(path = "email/new_order_alert.txt")]
struct NewOrderAlertText<'a> {
    order: &'a Order,
}

#[derive(Template)]
#[template(path = "email/contact_message.html")]
struct ContactMessageHtml<'a> {
    message: &'a ContactMessage,
}

#[derive(Template)]
#[template(path = "email/contact_message.txt")]
struct ContactMessageText<'a> {
    message: &'a ContactMessage,
}

#[derive(Template)]
#[template(path = "email/contact_ack.html")]
struct ContactAckHtml<'a> {
    name: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact_ack.txt")]
struct ContactAckText<'a> {
    name: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A rendered message, ready to hand to the transport.
#[derive(Debug)]
struct Rendered {
    subject: String,
    text: String,
    html: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(&self, to: &str, rendered: Rendered) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(&rendered.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(rendered.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(rendered.html),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %rendered.subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let rendered = render(notification)?;
        self.send_multipart_email(notification.recipient().as_str(), rendered)
            .await?;
        Ok(())
    }
}

fn render(notification: &Notification) -> Result<Rendered, EmailError> {
    let rendered = match notification {
        Notification::OtpCode {
            code,
            expires_in_minutes,
            ..
        } => Rendered {
            subject: "Your Greenhouse verification code".to_owned(),
            text: OtpCodeText {
                code,
                minutes: *expires_in_minutes,
            }
            .render()?,
            html: OtpCodeHtml {
                code,
                minutes: *expires_in_minutes,
            }
            .render()?,
        },
        Notification::Welcome { name, .. } => Rendered {
            subject: "Welcome to Greenhouse".to_owned(),
            text: WelcomeText { name }.render()?,
            html: WelcomeHtml { name }.render()?,
        },
        Notification::OrderConfirmation { order } => Rendered {
            subject: format!("Order {} confirmed", order.id),
            text: OrderConfirmationText { order }.render()?,
            html: OrderConfirmationHtml { order }.render()?,
        },
        Notification::NewOrderAlert { order, .. } => Rendered {
            subject: format!("New order {} ({})", order.id, order.total),
            text: NewOrderAlertText { order }.render()?,
            html: NewOrderAlertHtml { order }.render()?,
        },
        Notification::ContactMessage { message, .. } => Rendered {
            subject: format!("Contact form: {}", message.subject),
            text: ContactMessageText { message }.render()?,
            html: ContactMessageHtml { message }.render()?,
        },
        Notification::ContactAcknowledgement { message } => Rendered {
            subject: "We received your message".to_owned(),
            text: ContactAckText {
                name: &message.name,
            }
            .render()?,
            html: ContactAckHtml {
                name: &message.name,
            }
            .render()?,
        },
    };
    Ok(rendered)
}
