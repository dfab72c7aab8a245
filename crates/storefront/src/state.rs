//! Application state shared across handlers.

use std::sync::Arc;

use crate::clock::{SharedClock, SystemClock};
use crate::config::StorefrontConfig;
use crate::db::{DisabledMirror, OrderMirror};
use crate::services::cart::CartStore;
use crate::services::catalog::StaticCatalog;
use crate::services::identity::{IdentitySettings, IdentityStore};
use crate::services::notifier::{LogNotifier, SharedNotifier};
use crate::services::orders::{OrderManager, OrderSettings};
use crate::services::otp::{OtpRegistry, OtpSettings};

/// External collaborators the stores are built on.
///
/// `main` picks real implementations from configuration; tests substitute
/// recording doubles and a manual clock.
#[derive(Clone)]
pub struct Collaborators {
    pub clock: SharedClock,
    pub notifier: SharedNotifier,
    pub mirror: Arc<dyn OrderMirror>,
    pub catalog: Arc<StaticCatalog>,
}

impl Default for Collaborators {
    /// System clock, log-only notifier, no mirror, seeded catalog.
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
            mirror: Arc::new(DisabledMirror),
            catalog: Arc::new(StaticCatalog::seeded()),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Each store guards its own
/// data, created once at start-up (or once per test).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    clock: SharedClock,
    notifier: SharedNotifier,
    catalog: Arc<StaticCatalog>,
    identity: IdentityStore,
    carts: CartStore,
    orders: OrderManager,
}

impl AppState {
    /// Build the stores from configuration and collaborators.
    #[must_use]
    pub fn new(config: StorefrontConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            clock,
            notifier,
            mirror,
            catalog,
        } = collaborators;

        let otp = Arc::new(OtpRegistry::new(
            clock.clone(),
            notifier.clone(),
            OtpSettings {
                expose_on_delivery_failure: config.expose_otp_on_delivery_failure,
                dispatch_timeout: config.side_effect_timeout,
                ..OtpSettings::default()
            },
        ));

        let identity = IdentityStore::new(
            otp,
            clock.clone(),
            notifier.clone(),
            IdentitySettings {
                notify_timeout: config.side_effect_timeout,
                ..IdentitySettings::new(config.bootstrap_admin_email.clone())
            },
        );

        let carts = CartStore::new(catalog.clone());

        let orders = OrderManager::new(
            clock.clone(),
            notifier.clone(),
            mirror,
            OrderSettings {
                shop_inbox: config.admin_notify_email.clone(),
                side_effect_timeout: config.side_effect_timeout,
            },
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                clock,
                notifier,
                catalog,
                identity,
                carts,
                orders,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.inner.clock
    }

    #[must_use]
    pub fn notifier(&self) -> &SharedNotifier {
        &self.inner.notifier
    }

    #[must_use]
    pub fn catalog(&self) -> &StaticCatalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityStore {
        &self.inner.identity
    }

    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    #[must_use]
    pub fn orders(&self) -> &OrderManager {
        &self.inner.orders
    }
}
