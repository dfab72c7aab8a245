//! Order route handlers.
//!
//! Checkout either goes through `create-pending` then `confirm-payment`
//! (online payment) or the one-step legacy `POST /orders`. Listing, status
//! changes and the dashboard are admin-only; a single order can be tracked
//! by anyone holding its id.

use axum::{Json, extract::State};
use greenhouse_core::{OrderId, PaymentStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::{Order, OrderDraft};
use crate::routes::{ApiJson, ApiPath};
use crate::services::orders::{DashboardStats, StatusUpdate};
use crate::state::AppState;

/// Body of `confirm-payment`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentForm {
    pub order_id: OrderId,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
}

const fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Completed
}

/// Response to order creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub order_id: OrderId,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub success: bool,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

/// Start an order that waits for online payment.
#[instrument(skip_all)]
pub async fn create_pending(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<OrderDraft>,
) -> Result<Json<CreatedResponse>, AppError> {
    let order = state.orders().create_pending(draft).await?;
    add_breadcrumb(
        "checkout",
        "Pending order created",
        Some(&[("order_id", order.id.as_str())]),
    );

    Ok(Json(CreatedResponse {
        success: true,
        message: "Order created, awaiting payment",
        order_id: order.id.clone(),
        order,
    }))
}

/// Record the payment outcome of a pending order.
#[instrument(skip(state))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<ConfirmPaymentForm>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders()
        .confirm_payment(&form.order_id, form.payment_status)
        .await?;
    add_breadcrumb(
        "checkout",
        "Payment confirmed",
        Some(&[
            ("order_id", order.id.as_str()),
            ("payment_status", order.payment_status.as_str()),
        ]),
    );

    Ok(Json(OrderResponse {
        success: true,
        message: Some("Payment confirmed"),
        order,
    }))
}

/// One-step order creation with payment already settled.
#[instrument(skip_all)]
pub async fn create_legacy(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<OrderDraft>,
) -> Result<Json<CreatedResponse>, AppError> {
    let order = state.orders().create_legacy(draft).await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", order.id.as_str())]),
    );

    Ok(Json(CreatedResponse {
        success: true,
        message: "Order placed successfully",
        order_id: order.id.clone(),
        order,
    }))
}

/// All orders, newest first.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<OrdersResponse> {
    Json(OrdersResponse {
        success: true,
        orders: state.orders().list().await,
    })
}

/// Track a single order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders().get(&id).await?;
    Ok(Json(OrderResponse {
        success: true,
        message: None,
        order,
    }))
}

/// Overwrite an order's status fields.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders().update_status(&id, update).await?;
    Ok(Json(OrderResponse {
        success: true,
        message: Some("Order updated"),
        order,
    }))
}

/// Dashboard aggregates.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Json<StatsResponse> {
    let stats = state
        .orders()
        .stats(state.catalog(), state.identity())
        .await;
    Json(StatsResponse {
        success: true,
        stats,
    })
}
