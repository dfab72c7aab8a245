//! Session-scoped shopping carts.
//!
//! Each session holds an ordered list of lines, at most one per plant, each
//! with a frozen snapshot of the plant taken when it was first added. Totals
//! are derived on every read.

use std::collections::HashMap;
use std::sync::Arc;

use greenhouse_core::PlantId;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{CartLine, CartView, MAX_LINE_QUANTITY, Plant};
use crate::services::catalog::Catalog;

/// Session key used when the caller does not supply one.
pub const DEFAULT_SESSION: &str = "default";

/// Errors from cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity outside the accepted range.
    #[error("{0}")]
    InvalidQuantity(String),

    /// The plant does not exist, or the catalog could not be reached.
    #[error("Plant not found")]
    PlantNotFound(PlantId),

    /// Not enough stock for the requested increment.
    #[error("Only {available} of {name} available")]
    OutOfStock { name: String, available: u32 },

    /// No line for this plant in the cart.
    #[error("Item not found in cart")]
    LineNotFound(PlantId),
}

/// All carts, keyed by session id.
pub struct CartStore {
    carts: Mutex<HashMap<String, Vec<CartLine>>>,
    catalog: Arc<dyn Catalog>,
}

impl CartStore {
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            carts: Mutex::default(),
            catalog,
        }
    }

    /// Current contents and totals; an unknown session reads as empty.
    pub async fn get(&self, session: &str) -> CartView {
        self.carts
            .lock()
            .await
            .get(session)
            .map_or_else(CartView::empty, |lines| CartView::from_lines(lines))
    }

    /// Add `quantity` units of a plant.
    ///
    /// Stock is checked against the requested increment, not the resulting
    /// line quantity. A failed add leaves the cart untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for quantities below one or a line that
    /// would exceed [`MAX_LINE_QUANTITY`], `PlantNotFound`
    /// when the catalog cannot resolve the plant and `OutOfStock` when the
    /// increment exceeds what is available.
    #[tracing::instrument(skip(self))]
    pub async fn add(
        &self,
        session: &str,
        plant_id: &PlantId,
        quantity: i64,
    ) -> Result<CartView, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(
                "Quantity must be at least 1".to_owned(),
            ));
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or_else(too_many)?;

        let plant = self.resolve(plant_id).await?;
        if !plant.can_supply(quantity) {
            return Err(CartError::OutOfStock {
                name: plant.name,
                available: if plant.in_stock { plant.stock_quantity } else { 0 },
            });
        }

        let mut carts = self.carts.lock().await;
        let lines = carts.entry(session.to_owned()).or_default();
        match lines.iter_mut().find(|line| line.plant_id() == plant_id) {
            Some(line) => {
                let merged = line.quantity + quantity;
                if merged > MAX_LINE_QUANTITY {
                    return Err(too_many());
                }
                line.quantity = merged;
            }
            None => lines.push(CartLine { plant, quantity }),
        }

        tracing::debug!("Added to cart");
        Ok(CartView::from_lines(lines))
    }

    /// Overwrite a line's quantity; zero removes the line.
    ///
    /// Stock is not re-checked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for negative quantities or quantities above
    /// [`MAX_LINE_QUANTITY`], and `LineNotFound`
    /// when there is no line to update.
    #[tracing::instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        session: &str,
        plant_id: &PlantId,
        quantity: i64,
    ) -> Result<CartView, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity(
                "Quantity cannot be negative".to_owned(),
            ));
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or_else(too_many)?;

        if quantity == 0 {
            return Ok(self.remove(session, plant_id).await);
        }

        let mut carts = self.carts.lock().await;
        let line = carts
            .get_mut(session)
            .and_then(|lines| lines.iter_mut().find(|line| line.plant_id() == plant_id))
            .ok_or_else(|| CartError::LineNotFound(plant_id.clone()))?;
        line.quantity = quantity;

        Ok(carts
            .get(session)
            .map_or_else(CartView::empty, |lines| CartView::from_lines(lines)))
    }

    /// Remove a line. Removing an absent line is a no-op.
    pub async fn remove(&self, session: &str, plant_id: &PlantId) -> CartView {
        let mut carts = self.carts.lock().await;
        let Some(lines) = carts.get_mut(session) else {
            return CartView::empty();
        };
        lines.retain(|line| line.plant_id() != plant_id);
        CartView::from_lines(lines)
    }

    /// Drop the whole cart.
    pub async fn clear(&self, session: &str) -> CartView {
        self.carts.lock().await.remove(session);
        CartView::empty()
    }

    async fn resolve(&self, plant_id: &PlantId) -> Result<Plant, CartError> {
        match self.catalog.get(plant_id).await {
            Ok(Some(plant)) => Ok(plant),
            Ok(None) => Err(CartError::PlantNotFound(plant_id.clone())),
            Err(e) => {
                tracing::warn!(plant_id = %plant_id, error = %e, "Catalog lookup failed");
                Err(CartError::PlantNotFound(plant_id.clone()))
            }
        }
    }
}

fn too_many() -> CartError {
    CartError::InvalidQuantity(format!(
        "Quantity cannot exceed {MAX_LINE_QUANTITY} per item"
    ))
}
