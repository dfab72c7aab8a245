//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the server runs fully in memory with a
//! log-only notifier when nothing is set.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 5000)
//! - `STOREFRONT_DATABASE_URL` / `DATABASE_URL` - Postgres URL for the order mirror
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `EMAIL_FROM` - Email delivery
//! - `ADMIN_NOTIFY_EMAIL` - Shop inbox for new-order and contact notifications
//! - `BOOTSTRAP_ADMIN_EMAIL` - Email granted admin rights (default: admin@greenhouse.local)
//! - `BOOTSTRAP_ADMIN_PASSWORD` - Seeds the bootstrap admin at start-up when set
//! - `EXPOSE_OTP_ON_DELIVERY_FAILURE` - Return OTPs in responses when email fails (default: true)
//! - `SIDE_EFFECT_TIMEOUT_SECS` - Bound on notifier and mirror calls (default: 5)
//! - `CORS_ALLOWED_ORIGIN` - Single allowed origin (default: any)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Sentry error tracking

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use greenhouse_core::Email;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SIDE_EFFECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_BOOTSTRAP_ADMIN_EMAIL: &str = "admin@greenhouse.local";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Postgres URL for the best-effort order mirror (contains password)
    pub database_url: Option<SecretString>,
    /// SMTP settings; `None` means notifications are only logged
    pub email: Option<EmailConfig>,
    /// Shop inbox receiving order alerts and contact messages
    pub admin_notify_email: Option<Email>,
    /// The one email address that is granted admin rights
    pub bootstrap_admin_email: Email,
    /// Password for seeding the bootstrap admin at start-up
    pub bootstrap_admin_password: Option<SecretString>,
    /// Return the OTP in the response when it cannot be delivered
    pub expose_otp_on_delivery_failure: bool,
    /// Upper bound on any single notifier or mirror call
    pub side_effect_timeout: Duration,
    /// Allowed CORS origin (`None` allows any origin)
    pub cors_allowed_origin: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// SMTP email configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// `From:` header, e.g. `Greenhouse <hello@greenhouse.in>`
    pub from_address: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed,
    /// or if only part of the SMTP settings are provided.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let host = parse_env_or("STOREFRONT_HOST", defaults.host)?;
        let port = parse_env_or("STOREFRONT_PORT", defaults.port)?;
        let database_url = get_optional_env("STOREFRONT_DATABASE_URL")
            .or_else(|| get_optional_env("DATABASE_URL"))
            .map(SecretString::from);

        let email = EmailConfig::from_env()?;
        let admin_notify_email = get_optional_env("ADMIN_NOTIFY_EMAIL")
            .map(|value| parse_email("ADMIN_NOTIFY_EMAIL", &value))
            .transpose()?;
        let bootstrap_admin_email = get_optional_env("BOOTSTRAP_ADMIN_EMAIL").map_or_else(
            || Ok(defaults.bootstrap_admin_email.clone()),
            |value| parse_email("BOOTSTRAP_ADMIN_EMAIL", &value),
        )?;
        let bootstrap_admin_password =
            get_optional_env("BOOTSTRAP_ADMIN_PASSWORD").map(SecretString::from);

        let expose_otp_on_delivery_failure = parse_env_or(
            "EXPOSE_OTP_ON_DELIVERY_FAILURE",
            defaults.expose_otp_on_delivery_failure,
        )?;
        let side_effect_timeout = Duration::from_secs(parse_env_or(
            "SIDE_EFFECT_TIMEOUT_SECS",
            DEFAULT_SIDE_EFFECT_TIMEOUT_SECS,
        )?);

        Ok(Self {
            host,
            port,
            database_url,
            email,
            admin_notify_email,
            bootstrap_admin_email,
            bootstrap_admin_password,
            expose_otp_on_delivery_failure,
            side_effect_timeout,
            cors_allowed_origin: get_optional_env("CORS_ALLOWED_ORIGIN"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            database_url: None,
            email: None,
            admin_notify_email: None,
            bootstrap_admin_email: Email::parse(DEFAULT_BOOTSTRAP_ADMIN_EMAIL)
                .unwrap_or_else(|_| unreachable!("default admin email is well-formed")),
            bootstrap_admin_password: None,
            expose_otp_on_delivery_failure: true,
            side_effect_timeout: Duration::from_secs(DEFAULT_SIDE_EFFECT_TIMEOUT_SECS),
            cors_allowed_origin: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl EmailConfig {
    /// SMTP is enabled only when `SMTP_HOST` is set; the rest then become required.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env_or("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("EMAIL_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| parse_value(key, &value))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_email(key: &str, value: &str) -> Result<Email, ConfigError> {
    Email::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.port, 5000);
        assert!(config.expose_otp_on_delivery_failure);
        assert_eq!(config.side_effect_timeout, Duration::from_secs(5));
        assert_eq!(
            config.bootstrap_admin_email.as_str(),
            "admin@greenhouse.local"
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            ..StorefrontConfig::default()
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_parse_value_reports_variable() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "http").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));

        let flag: bool = parse_value("EXPOSE_OTP_ON_DELIVERY_FAILURE", " false ").unwrap();
        assert!(!flag);
    }

    #[test]
    fn test_parse_email_normalizes() {
        let email = parse_email("ADMIN_NOTIFY_EMAIL", "Orders@Greenhouse.IN").unwrap();
        assert_eq!(email.as_str(), "orders@greenhouse.in");
        assert!(parse_email("ADMIN_NOTIFY_EMAIL", "orders").is_err());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("hunter2-but-longer"),
            from_address: "Greenhouse <hello@greenhouse.in>".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(!debug_output.contains("hunter2-but-longer"));
        assert_eq!(config.smtp_password.expose_secret(), "hunter2-but-longer");
    }
}
