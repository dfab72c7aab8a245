//! Order lifecycle.
//!
//! ```text
//! create_pending ─▶ pending_payment ──confirm_payment──▶ processing ─▶ shipped ─▶ delivered
//!                                                             └─▶ cancelled
//! create_legacy  ─▶ pending (payment already completed)
//! ```
//!
//! Only `confirm_payment` enforces a transition; administrative
//! `update_status` overwrites whatever it is given. Every committed change is
//! handed to the [`OrderMirror`] afterwards, and notifications go out
//! best-effort; neither can fail the operation.

mod error;
mod id;
pub mod stats;

pub use error::OrderError;
pub use stats::DashboardStats;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use greenhouse_core::{Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, Price};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::clock::SharedClock;
use crate::db::{OrderChange, OrderMirror};
use crate::models::{
    CustomerInfo, CustomerInput, MAX_LINE_QUANTITY, Order, OrderDraft, OrderLine,
    ShippingAddress, ShippingAddressInput,
};
use crate::services::catalog::Catalog;
use crate::services::identity::IdentityStore;
use crate::services::notifier::{Notification, SharedNotifier, deliver_best_effort};

/// Administrative status change; absent fields are left alone.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// Order manager settings.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    /// Shop inbox for new-order alerts.
    pub shop_inbox: Option<Email>,
    /// Bound on each mirror and notifier call.
    pub side_effect_timeout: Duration,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            shop_inbox: None,
            side_effect_timeout: Duration::from_secs(5),
        }
    }
}

/// In-memory order book.
pub struct OrderManager {
    orders: RwLock<HashMap<OrderId, Order>>,
    clock: SharedClock,
    notifier: SharedNotifier,
    mirror: Arc<dyn OrderMirror>,
    settings: OrderSettings,
}

impl OrderManager {
    #[must_use]
    pub fn new(
        clock: SharedClock,
        notifier: SharedNotifier,
        mirror: Arc<dyn OrderMirror>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            orders: RwLock::default(),
            clock,
            notifier,
            mirror,
            settings,
        }
    }

    /// Create an order awaiting payment.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for missing customer details, address
    /// or lines, non-positive quantities, negative amounts, or a total that
    /// is not `subtotal + shipping`.
    #[tracing::instrument(skip_all)]
    pub async fn create_pending(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        let order = self
            .build(draft, OrderStatus::PendingPayment, PaymentStatus::Pending)
            .await?;
        tracing::info!(order_id = %order.id, total = %order.total, "Pending order created");

        self.mirror_change(OrderChange::Created(&order)).await;
        Ok(order)
    }

    /// Record the payment outcome for an order awaiting payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `InvalidState` unless the
    /// order is `pending_payment`.
    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn confirm_payment(
        &self,
        id: &OrderId,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        let order = {
            let mut orders = self.orders.write().await;
            let order = orders
                .get_mut(id)
                .ok_or_else(|| OrderError::NotFound(id.clone()))?;

            if order.status != OrderStatus::PendingPayment {
                return Err(OrderError::InvalidState {
                    id: id.clone(),
                    status: order.status,
                });
            }

            order.status = OrderStatus::Processing;
            order.payment_status = payment_status;
            order.updated_at = self.clock.now();
            order.clone()
        };
        tracing::info!(payment_status = %payment_status, "Payment confirmed");

        self.mirror_change(OrderChange::Updated(&order)).await;
        self.notify_placed(&order).await;
        Ok(order)
    }

    /// Create an order whose payment is already complete.
    ///
    /// # Errors
    ///
    /// Same validation as [`Self::create_pending`].
    #[tracing::instrument(skip_all)]
    pub async fn create_legacy(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        let order = self
            .build(draft, OrderStatus::Pending, PaymentStatus::Completed)
            .await?;
        tracing::info!(order_id = %order.id, total = %order.total, "Order created");

        self.mirror_change(OrderChange::Created(&order)).await;
        self.notify_placed(&order).await;
        Ok(order)
    }

    /// Overwrite status fields without transition checks.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn update_status(
        &self,
        id: &OrderId,
        update: StatusUpdate,
    ) -> Result<Order, OrderError> {
        let order = {
            let mut orders = self.orders.write().await;
            let order = orders
                .get_mut(id)
                .ok_or_else(|| OrderError::NotFound(id.clone()))?;

            if let Some(status) = update.status {
                order.status = status;
            }
            if let Some(payment_status) = update.payment_status {
                order.payment_status = payment_status;
            }
            order.updated_at = self.clock.now();
            order.clone()
        };
        tracing::info!(status = %order.status, payment_status = %order.payment_status, "Order updated");

        self.mirror_change(OrderChange::Updated(&order)).await;
        Ok(order)
    }

    /// Look up one order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub async fn get(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound(id.clone()))
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        orders
    }

    /// Dashboard aggregates. A failing catalog counts as zero products.
    pub async fn stats(&self, catalog: &dyn Catalog, identity: &IdentityStore) -> DashboardStats {
        let total_products = catalog.count().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Catalog count unavailable for dashboard");
            0
        });
        let total_users = identity.count_users().await;
        let orders = self.list().await;

        stats::compute(&orders, self.clock.now(), total_products, total_users)
    }

    async fn build(
        &self,
        draft: OrderDraft,
        status: OrderStatus,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrderError> {
        let valid = validate(draft)?;
        let now = self.clock.now();

        let mut orders = self.orders.write().await;
        let mut id = id::generate(now);
        while orders.contains_key(&id) {
            id = id::generate(now);
        }

        let order = Order {
            id: id.clone(),
            customer_info: valid.customer,
            shipping_address: valid.address,
            items: valid.lines,
            subtotal: valid.subtotal,
            shipping: valid.shipping,
            tax: Price::ZERO,
            total: valid.total,
            status,
            payment_method: valid.payment_method,
            payment_status,
            created_at: now,
            updated_at: now,
        };
        orders.insert(id, order.clone());
        Ok(order)
    }

    async fn mirror_change(&self, change: OrderChange<'_>) {
        let timeout = self.settings.side_effect_timeout;
        if tokio::time::timeout(timeout, self.mirror.mirror(change))
            .await
            .is_err()
        {
            tracing::warn!(
                order_id = %change.order().id,
                timeout_secs = timeout.as_secs(),
                "Order mirror timed out"
            );
        }
    }

    async fn notify_placed(&self, order: &Order) {
        let timeout = self.settings.side_effect_timeout;
        deliver_best_effort(
            self.notifier.as_ref(),
            &Notification::OrderConfirmation {
                order: Box::new(order.clone()),
            },
            timeout,
        )
        .await;

        if let Some(inbox) = &self.settings.shop_inbox {
            deliver_best_effort(
                self.notifier.as_ref(),
                &Notification::NewOrderAlert {
                    to: inbox.clone(),
                    order: Box::new(order.clone()),
                },
                timeout,
            )
            .await;
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

struct ValidOrder {
    customer: CustomerInfo,
    address: ShippingAddress,
    lines: Vec<OrderLine>,
    subtotal: Price,
    shipping: Price,
    total: Price,
    payment_method: PaymentMethod,
}

fn validate(draft: OrderDraft) -> Result<ValidOrder, OrderError> {
    let customer = validate_customer(
        draft
            .customer_info
            .ok_or_else(|| invalid("Customer information is required"))?,
    )?;
    let address = validate_address(
        draft
            .shipping_address
            .ok_or_else(|| invalid("Shipping address is required"))?,
    )?;

    if draft.items.is_empty() {
        return Err(invalid("Order must contain at least one item"));
    }
    let mut lines = Vec::with_capacity(draft.items.len());
    for item in draft.items {
        if item.quantity == 0 {
            return Err(invalid(&format!("Quantity for {} must be at least 1", item.id)));
        }
        if item.quantity > MAX_LINE_QUANTITY {
            return Err(invalid(&format!(
                "Quantity for {} cannot exceed {MAX_LINE_QUANTITY}",
                item.id
            )));
        }
        if item.price.is_negative() {
            return Err(invalid(&format!("Price for {} cannot be negative", item.id)));
        }
        let total_price = item.price.checked_times(item.quantity).ok_or_else(too_large)?;
        let name = item.name.trim();
        lines.push(OrderLine {
            name: if name.is_empty() {
                item.id.to_string()
            } else {
                name.to_owned()
            },
            plant_id: item.id,
            quantity: item.quantity,
            price: item.price,
            total_price,
        });
    }

    let subtotal = match draft.subtotal {
        Some(subtotal) => subtotal,
        None => Price::checked_sum(lines.iter().map(|line| line.total_price))
            .ok_or_else(too_large)?,
    };
    let shipping = draft.shipping.unwrap_or(Price::ZERO);
    if subtotal.is_negative() || shipping.is_negative() {
        return Err(invalid("Amounts cannot be negative"));
    }
    let expected = subtotal.checked_add(shipping).ok_or_else(too_large)?;
    let total = draft.total.unwrap_or(expected);
    if total != expected {
        return Err(invalid("Total must equal subtotal plus shipping"));
    }

    Ok(ValidOrder {
        customer,
        address,
        lines,
        subtotal,
        shipping,
        total,
        payment_method: draft.payment_method,
    })
}

fn validate_customer(input: CustomerInput) -> Result<CustomerInfo, OrderError> {
    let name = required("Customer name", &input.name)?;
    let email = Email::parse(&input.email)
        .map_err(|e| invalid(&format!("Customer email is invalid: {e}")))?;
    let phone = required("Customer phone", &input.phone)?;
    Ok(CustomerInfo { name, email, phone })
}

fn validate_address(input: ShippingAddressInput) -> Result<ShippingAddress, OrderError> {
    Ok(ShippingAddress {
        address: required("Address", &input.address)?,
        landmark: input
            .landmark
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty()),
        city: required("City", &input.city)?,
        state: required("State", &input.state)?,
        pincode: required("Pincode", &input.pincode)?,
    })
}

fn required(field: &str, value: &str) -> Result<String, OrderError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(&format!("{field} is required")));
    }
    Ok(value.to_owned())
}

fn invalid(message: &str) -> OrderError {
    OrderError::Validation(message.to_owned())
}

fn too_large() -> OrderError {
    invalid("Amount is too large")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use greenhouse_core::PlantId;

    use super::*;
    use crate::clock::ManualClock;
    use crate::db::RecordingMirror;
    use crate::models::OrderItemInput;
    use crate::services::notifier::RecordingNotifier;

    struct Harness {
        manager: OrderManager,
        clock: ManualClock,
        notifier: Arc<RecordingNotifier>,
        mirror: Arc<RecordingMirror>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_notifier(RecordingNotifier::new())
        }

        fn with_notifier(notifier: RecordingNotifier) -> Self {
            let clock = ManualClock::default();
            let notifier = Arc::new(notifier);
            let mirror = Arc::new(RecordingMirror::new());
            let settings = OrderSettings {
                shop_inbox: Some(Email::parse("orders@greenhouse.in").unwrap()),
                side_effect_timeout: Duration::from_secs(2),
            };
            Self {
                manager: OrderManager::new(
                    Arc::new(clock.clone()),
                    notifier.clone(),
                    mirror.clone(),
                    settings,
                ),
                clock,
                notifier,
                mirror,
            }
        }
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            customer_info: Some(CustomerInput {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                phone: "9999999999".to_string(),
            }),
            shipping_address: Some(ShippingAddressInput {
                address: "12 MG Road".to_string(),
                landmark: Some("  ".to_string()),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
            }),
            items: vec![
                OrderItemInput {
                    id: PlantId::new("peace-lily"),
                    name: "Peace Lily".to_string(),
                    price: Price::from_rupees(300),
                    quantity: 2,
                },
                OrderItemInput {
                    id: PlantId::new("pothos-golden"),
                    name: "Golden Pothos".to_string(),
                    price: Price::from_rupees(300),
                    quantity: 1,
                },
            ],
            subtotal: Some(Price::from_rupees(900)),
            shipping: Some(Price::from_rupees(100)),
            total: Some(Price::from_rupees(1000)),
            payment_method: PaymentMethod::Upi,
        }
    }

    #[tokio::test]
    async fn test_pending_then_confirm_then_invalid_state() {
        let h = Harness::new();
        let order = h.manager.create_pending(draft()).await.unwrap();
        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total, order.subtotal + order.shipping);
        assert_eq!(order.shipping_address.landmark, None);

        h.clock.advance(ChronoDuration::minutes(3));
        let confirmed = h
            .manager
            .confirm_payment(&order.id, PaymentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Processing);
        assert_eq!(confirmed.payment_status, PaymentStatus::Completed);
        assert!(confirmed.updated_at > confirmed.created_at);

        let again = h
            .manager
            .confirm_payment(&order.id, PaymentStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(
            again,
            OrderError::InvalidState {
                id: order.id.clone(),
                status: OrderStatus::Processing
            }
        );

        assert_eq!(h.notifier.count_kind("order_confirmation"), 1);
        assert_eq!(h.notifier.count_kind("new_order_alert"), 1);
        let kinds: Vec<_> = h.mirror.changes().into_iter().map(|c| c.0).collect();
        assert_eq!(kinds, vec!["created", "updated"]);
    }

    #[tokio::test]
    async fn test_line_totals_are_frozen() {
        let h = Harness::new();
        let order = h.manager.create_pending(draft()).await.unwrap();
        for line in &order.items {
            assert_eq!(line.total_price, line.price.times(line.quantity));
        }
        assert_eq!(order.items[0].total_price, Price::from_rupees(600));
    }

    #[tokio::test]
    async fn test_confirm_unknown_order() {
        let h = Harness::new();
        let id = OrderId::new("ORD-NOPE-0000");
        assert_eq!(
            h.manager
                .confirm_payment(&id, PaymentStatus::Completed)
                .await
                .unwrap_err(),
            OrderError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let h = Harness::new();

        let mut missing_customer = draft();
        missing_customer.customer_info = None;
        let mut missing_address = draft();
        missing_address.shipping_address = None;
        let mut no_items = draft();
        no_items.items.clear();
        let mut bad_total = draft();
        bad_total.total = Some(Price::from_rupees(999));
        let mut zero_qty = draft();
        zero_qty.items[0].quantity = 0;

        for bad in [missing_customer, missing_address, no_items, bad_total, zero_qty] {
            assert!(matches!(
                h.manager.create_pending(bad).await,
                Err(OrderError::Validation(_))
            ));
        }
        assert!(h.manager.list().await.is_empty());
        assert!(h.mirror.changes().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_rejected() {
        let h = Harness::new();

        let mut huge_line = draft();
        huge_line.items[0].price = Price::MAX;
        huge_line.subtotal = None;
        huge_line.total = None;
        let mut huge_total = draft();
        huge_total.subtotal = Some(Price::MAX);
        huge_total.total = None;
        let mut too_many = draft();
        too_many.items[0].quantity = MAX_LINE_QUANTITY + 1;
        let mut overflowing_sum = draft();
        overflowing_sum.items[0].price = Price::MAX;
        overflowing_sum.items[0].quantity = 1;
        overflowing_sum.subtotal = None;
        overflowing_sum.total = None;

        for bad in [huge_line, huge_total, too_many, overflowing_sum] {
            assert!(matches!(
                h.manager.create_legacy(bad).await,
                Err(OrderError::Validation(_))
            ));
        }
        assert!(h.manager.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_totals_default_from_lines() {
        let h = Harness::new();
        let mut d = draft();
        d.subtotal = None;
        d.shipping = None;
        d.total = None;

        let order = h.manager.create_pending(d).await.unwrap();
        assert_eq!(order.subtotal, Price::from_rupees(900));
        assert_eq!(order.shipping, Price::ZERO);
        assert_eq!(order.total, Price::from_rupees(900));
    }

    #[tokio::test]
    async fn test_legacy_create_is_paid_and_notified() {
        let h = Harness::new();
        let order = h.manager.create_legacy(draft()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert_eq!(h.notifier.count_kind("order_confirmation"), 1);

        // Legacy orders skip the confirmation step.
        assert!(matches!(
            h.manager
                .confirm_payment(&order.id, PaymentStatus::Completed)
                .await,
            Err(OrderError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_confirmation() {
        let h = Harness::with_notifier(RecordingNotifier::failing());
        let order = h.manager.create_pending(draft()).await.unwrap();
        let confirmed = h
            .manager
            .confirm_payment(&order.id, PaymentStatus::Failed)
            .await
            .unwrap();
        assert_eq!(confirmed.payment_status, PaymentStatus::Failed);
        assert_eq!(confirmed.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_update_status_overwrites_anything() {
        let h = Harness::new();
        let order = h.manager.create_pending(draft()).await.unwrap();

        let updated = h
            .manager
            .update_status(
                &order.id,
                StatusUpdate {
                    status: Some(OrderStatus::Delivered),
                    payment_status: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert_eq!(updated.payment_status, PaymentStatus::Pending);

        let back = h
            .manager
            .update_status(
                &order.id,
                StatusUpdate {
                    status: Some(OrderStatus::PendingPayment),
                    payment_status: Some(PaymentStatus::Failed),
                },
            )
            .await
            .unwrap();
        assert_eq!(back.status, OrderStatus::PendingPayment);
        assert_eq!(h.manager.get(&order.id).await.unwrap().payment_status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let h = Harness::new();
        let first = h.manager.create_pending(draft()).await.unwrap();
        h.clock.advance(ChronoDuration::seconds(1));
        let second = h.manager.create_legacy(draft()).await.unwrap();

        let ids: Vec<_> = h.manager.list().await.into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    struct SlowMirror(RecordingMirror);

    #[async_trait]
    impl OrderMirror for SlowMirror {
        async fn mirror(&self, change: OrderChange<'_>) {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.mirror(change).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_settings_allow_slow_side_effects() {
        assert_eq!(
            OrderSettings::default().side_effect_timeout,
            Duration::from_secs(5)
        );

        let mirror = Arc::new(SlowMirror(RecordingMirror::new()));
        let manager = OrderManager::new(
            Arc::new(ManualClock::default()),
            Arc::new(RecordingNotifier::new()),
            mirror.clone(),
            OrderSettings::default(),
        );
        manager.create_pending(draft()).await.unwrap();
        assert_eq!(mirror.0.changes().len(), 1);
    }

    struct HangingMirror;

    #[async_trait]
    impl OrderMirror for HangingMirror {
        async fn mirror(&self, _: OrderChange<'_>) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_mirror_is_bounded() {
        let manager = OrderManager::new(
            Arc::new(ManualClock::default()),
            Arc::new(RecordingNotifier::new()),
            Arc::new(HangingMirror),
            OrderSettings {
                shop_inbox: None,
                side_effect_timeout: Duration::from_secs(1),
            },
        );
        let order = manager.create_pending(draft()).await.unwrap();
        assert_eq!(manager.get(&order.id).await.unwrap().id, order.id);
    }
}
