//! Cart route handlers.
//!
//! Every handler answers with the full cart view so clients can re-render
//! from the response alone. The cart is chosen by [`CartSession`].

use axum::{Json, extract::State};
use greenhouse_core::PlantId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::CartSession;
use crate::models::CartView;
use crate::routes::{ApiJson, ApiPath};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    #[serde(alias = "id")]
    pub plant_id: PlantId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartForm {
    #[serde(alias = "id")]
    pub plant_id: PlantId,
    pub quantity: i64,
}

/// Cart view with the success flag alongside.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(flatten)]
    pub cart: CartView,
}

impl CartResponse {
    const fn new(cart: CartView) -> Self {
        Self {
            success: true,
            message: None,
            cart,
        }
    }

    const fn with_message(cart: CartView, message: &'static str) -> Self {
        Self {
            success: true,
            message: Some(message),
            cart,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub success: bool,
    pub item_count: u64,
}

/// Display the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, session: CartSession) -> Json<CartResponse> {
    Json(CartResponse::new(state.carts().get(&session.0).await))
}

/// Add item to cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    session: CartSession,
    ApiJson(form): ApiJson<AddToCartForm>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state
        .carts()
        .add(&session.0, &form.plant_id, form.quantity)
        .await?;
    Ok(Json(CartResponse::with_message(cart, "Item added to cart")))
}

/// Set a line's quantity; zero removes it.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    session: CartSession,
    ApiJson(form): ApiJson<UpdateCartForm>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state
        .carts()
        .set_quantity(&session.0, &form.plant_id, form.quantity)
        .await?;
    Ok(Json(CartResponse::with_message(cart, "Cart updated")))
}

/// Remove a line from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    session: CartSession,
    ApiPath(plant_id): ApiPath<PlantId>,
) -> Json<CartResponse> {
    let cart = state.carts().remove(&session.0, &plant_id).await;
    Json(CartResponse::with_message(cart, "Item removed from cart"))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>, session: CartSession) -> Json<CartResponse> {
    let cart = state.carts().clear(&session.0).await;
    Json(CartResponse::with_message(cart, "Cart cleared"))
}

/// Cart count badge.
pub async fn count(State(state): State<AppState>, session: CartSession) -> Json<CountResponse> {
    Json(CountResponse {
        success: true,
        item_count: state.carts().get(&session.0).await.item_count,
    })
}
