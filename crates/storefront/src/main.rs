//! Greenhouse Storefront - REST backend for the plant shop.
//!
//! This binary serves the JSON API on port 5000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - In-memory stores for users, carts, OTPs and orders
//! - SMTP email with Askama templates when configured, log-only otherwise
//! - Optional `PostgreSQL` mirror of orders (never authoritative)
//!
//! Migrations for the mirror are NOT run on startup. Apply them with
//! `cargo run -p greenhouse-cli -- migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use greenhouse_storefront::config::StorefrontConfig;
use greenhouse_storefront::db::{self, DisabledMirror, OrderMirror, PgOrderMirror};
use greenhouse_storefront::routes;
use greenhouse_storefront::services::email::EmailService;
use greenhouse_storefront::services::notifier::{LogNotifier, SharedNotifier};
use greenhouse_storefront::state::{AppState, Collaborators};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Set up tracing with `EnvFilter`, plain or JSON output, and Sentry.
fn init_tracing() {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "greenhouse_storefront=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let (json_layer, text_layer) = if json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// SMTP notifier when configured, otherwise log-only.
fn build_notifier(config: &StorefrontConfig) -> SharedNotifier {
    let Some(email) = config.email.as_ref() else {
        tracing::warn!("SMTP not configured, notifications will only be logged");
        return Arc::new(LogNotifier);
    };

    match EmailService::new(email) {
        Ok(service) => {
            tracing::info!(host = %email.smtp_host, "Email notifier enabled");
            Arc::new(service)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create SMTP transport, falling back to log-only");
            Arc::new(LogNotifier)
        }
    }
}

/// Postgres order mirror when a database is configured.
fn build_mirror(config: &StorefrontConfig) -> Arc<dyn OrderMirror> {
    let Some(database_url) = config.database_url.as_ref() else {
        tracing::info!("No database configured, order mirror disabled");
        return Arc::new(DisabledMirror);
    };

    match db::create_pool(database_url) {
        Ok(pool) => {
            tracing::info!("Order mirror enabled");
            Arc::new(PgOrderMirror::new(pool))
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid database URL, order mirror disabled");
            Arc::new(DisabledMirror)
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let collaborators = Collaborators {
        notifier: build_notifier(&config),
        mirror: build_mirror(&config),
        ..Collaborators::default()
    };
    let state = AppState::new(config.clone(), collaborators);

    if let Some(password) = config.bootstrap_admin_password.clone() {
        state.identity().seed_admin("Administrator", password).await;
    }

    let app = routes::app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
