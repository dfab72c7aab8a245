//! Integration tests for Greenhouse.
//!
//! Each test starts the storefront router on an ephemeral port inside the
//! test's own runtime, with recording collaborators and a manual clock, and
//! talks to it over real HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p greenhouse-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, OTP login, password login, tokens, admin users
//! - `cart_flow` - Session carts and stock checks
//! - `order_flow` - Checkout, payment confirmation, admin order management
//! - `catalog` - Plant listing, categories and contact form

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use greenhouse_core::Email;
use greenhouse_storefront::clock::ManualClock;
use greenhouse_storefront::config::StorefrontConfig;
use greenhouse_storefront::db::RecordingMirror;
use greenhouse_storefront::routes;
use greenhouse_storefront::services::notifier::RecordingNotifier;
use greenhouse_storefront::state::{AppState, Collaborators};
use reqwest::Client;
use serde_json::{Value, json};

/// Email that becomes admin on registration in every test context.
pub const ADMIN_EMAIL: &str = "admin@greenhouse.local";

/// A running storefront plus handles on its collaborators.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
    pub mirror: Arc<RecordingMirror>,
    pub clock: ManualClock,
}

impl TestContext {
    /// Storefront with default configuration and a delivering notifier.
    pub async fn new() -> Self {
        Self::start(StorefrontConfig::default(), RecordingNotifier::new()).await
    }

    /// Storefront whose notifier fails every delivery.
    pub async fn with_failing_notifier() -> Self {
        Self::start(StorefrontConfig::default(), RecordingNotifier::failing()).await
    }

    /// Start a storefront over `config` and `notifier`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(config: StorefrontConfig, notifier: RecordingNotifier) -> Self {
        let clock = ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0)
                .single()
                .expect("valid start instant"),
        );
        let notifier = Arc::new(notifier);
        let mirror = Arc::new(RecordingMirror::new());

        let state = AppState::new(
            config,
            Collaborators {
                clock: Arc::new(clock.clone()),
                notifier: notifier.clone(),
                mirror: mirror.clone(),
                ..Collaborators::default()
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = routes::app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            state,
            notifier,
            mirror,
            clock,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body and return status and parsed response.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn post(&self, path: &str, body: &Value) -> (reqwest::StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        into_parts(resp).await
    }

    /// GET with an optional bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn get(&self, path: &str, token: Option<&str>) -> (reqwest::StatusCode, Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        into_parts(request.send().await.expect("Request failed")).await
    }

    /// The most recent OTP sent to `email`.
    ///
    /// # Panics
    ///
    /// Panics if no code was sent.
    #[must_use]
    pub fn last_code(&self, email: &str) -> String {
        let email = Email::parse(email).expect("valid email");
        self.notifier
            .last_code_for(&email)
            .expect("No OTP sent to this address")
    }

    /// Register and verify an account, returning `(token, user)`.
    ///
    /// # Panics
    ///
    /// Panics if any step does not succeed.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (String, Value) {
        let (status, _) = self
            .post(
                "/auth/register",
                &json!({
                    "name": name,
                    "email": email,
                    "phone": "+91 98765 43210",
                    "password": password,
                }),
            )
            .await;
        assert!(status.is_success(), "register failed with {status}");

        let code = self.last_code(email);
        let (status, body) = self
            .post("/auth/verify-otp", &json!({ "email": email, "otp": code }))
            .await;
        assert!(status.is_success(), "verify-otp failed with {status}");

        let token = body["token"]
            .as_str()
            .expect("token in verify response")
            .to_owned();
        (token, body["user"].clone())
    }

    /// Register the bootstrap admin and return its token.
    pub async fn admin_token(&self) -> String {
        self.register("Admin", ADMIN_EMAIL, "admin-pw").await.0
    }
}

async fn into_parts(resp: reqwest::Response) -> (reqwest::StatusCode, Value) {
    let status = resp.status();
    let body = resp.json().await.expect("Response body is not JSON");
    (status, body)
}

/// A valid checkout body for one Monstera with the given amounts.
#[must_use]
pub fn order_body(quantity: u32, subtotal: i64, shipping: i64, total: i64) -> Value {
    json!({
        "customerInfo": {
            "name": "Ann",
            "email": "ann@x.com",
            "phone": "+1",
        },
        "shippingAddress": {
            "address": "12 Garden Road",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411001",
        },
        "items": [{
            "id": "monstera-deliciosa-swiss",
            "name": "Swiss Cheese Monstera",
            "price": 1299,
            "quantity": quantity,
        }],
        "subtotal": subtotal,
        "shipping": shipping,
        "total": total,
        "paymentMethod": "upi",
    })
}
