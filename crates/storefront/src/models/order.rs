//! Order records and the unvalidated input used to create them.

use chrono::{DateTime, Utc};
use greenhouse_core::{Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, PlantId, Price};
use serde::{Deserialize, Serialize};

/// Validated customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: Email,
    pub phone: String,
}

/// Validated delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// A purchased item, frozen at order creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub plant_id: PlantId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    /// `price × quantity`, never recomputed after creation.
    pub total_price: Price,
}

/// A customer order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_info: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderLine>,
    pub subtotal: Price,
    pub shipping: Price,
    /// Always zero for now; kept so the total breakdown is explicit.
    pub tax: Price,
    pub total: Price,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Input types
// =============================================================================

/// Customer details as submitted by the checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Delivery address as submitted by the checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShippingAddressInput {
    pub address: String,
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// One cart snapshot line as submitted by the checkout form.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    #[serde(alias = "plantId")]
    pub id: PlantId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

/// Everything needed to create an order, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer_info: Option<CustomerInput>,
    pub shipping_address: Option<ShippingAddressInput>,
    pub items: Vec<OrderItemInput>,
    pub subtotal: Option<Price>,
    pub shipping: Option<Price>,
    pub total: Option<Price>,
    pub payment_method: PaymentMethod,
}
