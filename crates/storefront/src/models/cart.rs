//! Cart lines and the computed cart view.

use greenhouse_core::{PlantId, Price};
use serde::Serialize;

use super::plant::Plant;

/// Largest quantity a single cart or order line may hold.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// One catalog item in a session's cart.
///
/// Serializes as the plant snapshot with a `quantity` field alongside.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub plant: Plant,
    /// Always greater than zero while the line exists.
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn plant_id(&self) -> &PlantId {
        &self.plant.id
    }

    /// Snapshot price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.plant.price.times(self.quantity)
    }
}

/// Cart contents plus the derived totals, computed on every read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Price,
    pub item_count: u64,
}

impl CartView {
    /// The zero-state cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::ZERO,
            item_count: 0,
        }
    }

    /// Build a view over the given lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self {
            items: lines.to_vec(),
            total: lines.iter().map(CartLine::line_total).sum(),
            item_count: lines.iter().map(|line| u64::from(line.quantity)).sum(),
        }
    }
}
