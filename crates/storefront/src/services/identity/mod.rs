//! User directory, registration and login.
//!
//! Registration is a two-step flow: [`IdentityStore::register_request`] stages
//! a [`PendingRegistration`] and issues an OTP; [`IdentityStore::verify_otp`]
//! turns it into a [`User`]. The same verification also logs in an existing
//! user. Password login compares the stored secret by plain equality.

mod error;
mod token;

pub use error::IdentityError;
pub use token::{BearerToken, TOKEN_LIFETIME_DAYS};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Duration;
use greenhouse_core::{Email, UserId};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::clock::SharedClock;
use crate::models::{PendingRegistration, User};
use crate::services::notifier::{Notification, SharedNotifier, deliver_best_effort};
use crate::services::otp::{OtpIssued, OtpRegistry};

/// Registration details as submitted, before validation.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
}

/// Result of a successful OTP verification.
#[derive(Debug, Clone)]
pub struct Verified {
    pub user: User,
    /// `true` when the verification completed a registration.
    pub is_new: bool,
}

/// Identity store settings.
#[derive(Debug, Clone)]
pub struct IdentitySettings {
    /// The one email address that is made admin on registration.
    pub bootstrap_admin: Email,
    /// Lifetime of a pending registration.
    pub pending_ttl: Duration,
    /// Bound on the welcome notification.
    pub notify_timeout: std::time::Duration,
}

impl IdentitySettings {
    #[must_use]
    pub fn new(bootstrap_admin: Email) -> Self {
        Self {
            bootstrap_admin,
            pending_ttl: Duration::minutes(10),
            notify_timeout: std::time::Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Default)]
struct Directory {
    users: BTreeMap<UserId, User>,
    by_email: HashMap<Email, UserId>,
    pending: HashMap<Email, PendingRegistration>,
    last_id: i32,
}

impl Directory {
    fn find_by_email(&self, email: &Email) -> Option<&User> {
        self.by_email.get(email).and_then(|id| self.users.get(id))
    }

    fn insert(&mut self, build: impl FnOnce(UserId) -> User) -> User {
        self.last_id += 1;
        let user = build(UserId::new(self.last_id));
        self.by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        user
    }
}

/// In-memory user directory.
pub struct IdentityStore {
    directory: Mutex<Directory>,
    otp: Arc<OtpRegistry>,
    clock: SharedClock,
    notifier: SharedNotifier,
    settings: IdentitySettings,
}

impl IdentityStore {
    #[must_use]
    pub fn new(
        otp: Arc<OtpRegistry>,
        clock: SharedClock,
        notifier: SharedNotifier,
        settings: IdentitySettings,
    ) -> Self {
        Self {
            directory: Mutex::default(),
            otp,
            clock,
            notifier,
            settings,
        }
    }

    // =========================================================================
    // Registration and OTP login
    // =========================================================================

    /// Stage a registration and send the verification code.
    ///
    /// The details are staged only once a code has been issued, so a
    /// rate-limited request leaves any earlier staged registration intact. A
    /// repeated request that gets a fresh code replaces the staged details.
    ///
    /// # Errors
    ///
    /// Returns `UserAlreadyExists` if the email is taken, a validation error
    /// for missing fields, or the OTP error if issuance is rate-limited.
    #[tracing::instrument(skip_all, fields(email = %request.email))]
    pub async fn register_request(
        &self,
        request: RegistrationRequest,
    ) -> Result<(Email, OtpIssued), IdentityError> {
        let email = Email::parse(&request.email)?;
        let name = required("Name", &request.name)?;
        if request.password.expose_secret().is_empty() {
            return Err(IdentityError::Validation("Password is required".to_owned()));
        }

        if self.directory.lock().await.by_email.contains_key(&email) {
            return Err(IdentityError::UserAlreadyExists);
        }

        let issued = self.otp.issue(&email).await?;

        {
            let mut directory = self.directory.lock().await;
            if directory.by_email.contains_key(&email) {
                return Err(IdentityError::UserAlreadyExists);
            }
            directory.pending.insert(
                email.clone(),
                PendingRegistration {
                    email: email.clone(),
                    name,
                    phone: request.phone.trim().to_owned(),
                    password: request.password,
                    expires_at: self.clock.now() + self.settings.pending_ttl,
                },
            );
        }

        tracing::info!("Registration staged");
        Ok((email, issued))
    }

    /// Issue a code for an existing account or a live pending registration.
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` when neither exists, or the OTP error if
    /// issuance is rate-limited.
    #[tracing::instrument(skip(self))]
    pub async fn request_otp(&self, email: &str) -> Result<(Email, OtpIssued), IdentityError> {
        let email = Email::parse(email)?;
        let now = self.clock.now();

        {
            let mut directory = self.directory.lock().await;
            if directory.find_by_email(&email).is_none() {
                let live = directory
                    .pending
                    .get(&email)
                    .is_some_and(|pending| !pending.is_expired(now));
                if !live {
                    directory.pending.remove(&email);
                    return Err(IdentityError::NotRegistered);
                }
            }
        }

        let issued = self.otp.issue(&email).await?;
        Ok((email, issued))
    }

    /// Verify a code, completing a registration or logging in.
    ///
    /// # Errors
    ///
    /// Propagates the OTP error; returns `NotRegistered` when the code was
    /// good but there is neither an account nor an unexpired registration,
    /// and `Inactive` for a deactivated account. The code is consumed in both
    /// cases.
    #[tracing::instrument(skip(self, code))]
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Verified, IdentityError> {
        let email = Email::parse(email)?;
        self.otp.verify(&email, code).await?;

        let now = self.clock.now();
        let user = {
            let mut directory = self.directory.lock().await;

            if let Some(existing) = directory.find_by_email(&email) {
                if !existing.is_active {
                    return Err(IdentityError::Inactive);
                }
                tracing::info!(user_id = %existing.id, "OTP login");
                return Ok(Verified {
                    user: existing.clone(),
                    is_new: false,
                });
            }

            let pending = directory
                .pending
                .remove(&email)
                .filter(|pending| !pending.is_expired(now))
                .ok_or(IdentityError::NotRegistered)?;

            let is_admin = pending.email == self.settings.bootstrap_admin;
            directory.insert(|id| User {
                id,
                email: pending.email,
                name: pending.name,
                phone: pending.phone,
                password: pending.password,
                is_active: true,
                is_admin,
                created_at: now,
            })
        };

        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "Registration completed");
        deliver_best_effort(
            self.notifier.as_ref(),
            &Notification::Welcome {
                to: user.email.clone(),
                name: user.name.clone(),
            },
            self.settings.notify_timeout,
        )
        .await;

        Ok(Verified { user, is_new: true })
    }

    // =========================================================================
    // Password login and tokens
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEmail`, `Inactive` or `InvalidCredentials`.
    #[tracing::instrument(skip(self, password))]
    pub async fn password_login(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = Email::parse(email)?;
        let directory = self.directory.lock().await;

        let user = directory
            .find_by_email(&email)
            .ok_or(IdentityError::UnknownEmail)?;
        if !user.is_active {
            return Err(IdentityError::Inactive);
        }
        if !user.password_matches(password) {
            return Err(IdentityError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "Password login");
        Ok(user.clone())
    }

    /// Mint a bearer token for `user` stamped with the current time.
    #[must_use]
    pub fn issue_token(&self, user: &User) -> String {
        BearerToken::new(user.id, self.clock.now()).to_string()
    }

    /// Resolve a bearer token to its active user.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` for malformed or expired tokens, unknown users
    /// and deactivated accounts.
    pub async fn authenticate(&self, token: &str) -> Result<User, IdentityError> {
        let token = BearerToken::parse(token).ok_or(IdentityError::InvalidToken)?;
        if !token.is_valid_at(self.clock.now()) {
            return Err(IdentityError::InvalidToken);
        }

        self.directory
            .lock()
            .await
            .users
            .get(&token.user_id)
            .filter(|user| user.is_active)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }

    // =========================================================================
    // Administration
    // =========================================================================

    /// Activate or deactivate an account.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the id is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(&self, id: UserId, is_active: bool) -> Result<User, IdentityError> {
        let mut directory = self.directory.lock().await;
        let user = directory
            .users
            .get_mut(&id)
            .ok_or(IdentityError::UserNotFound)?;
        user.is_active = is_active;
        tracing::info!("Account status changed");
        Ok(user.clone())
    }

    /// Look up a user by id.
    pub async fn get_user(&self, id: UserId) -> Option<User> {
        self.directory.lock().await.users.get(&id).cloned()
    }

    /// All users, newest first.
    pub async fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.directory.lock().await.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        users
    }

    /// Number of registered users.
    pub async fn count_users(&self) -> usize {
        self.directory.lock().await.users.len()
    }

    /// Create the bootstrap admin account unless one already exists.
    pub async fn seed_admin(&self, name: &str, password: SecretString) -> User {
        let email = self.settings.bootstrap_admin.clone();
        let now = self.clock.now();
        let mut directory = self.directory.lock().await;

        if let Some(existing) = directory.find_by_email(&email) {
            return existing.clone();
        }

        let user = directory.insert(|id| User {
            id,
            email,
            name: name.to_owned(),
            phone: String::new(),
            password,
            is_active: true,
            is_admin: true,
            created_at: now,
        });
        tracing::info!(user_id = %user.id, email = %user.email, "Bootstrap admin seeded");
        user
    }
}

fn required(field: &str, value: &str) -> Result<String, IdentityError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(IdentityError::Validation(format!("{field} is required")));
    }
    Ok(value.to_owned())
}
