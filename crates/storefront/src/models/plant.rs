//! Catalog plant records.

use greenhouse_core::{PlantId, Price};
use serde::{Deserialize, Serialize};

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlantCategory {
    Indoor,
    Outdoor,
    Succulents,
    Flowering,
    AirPurifying,
    Planters,
}

impl PlantCategory {
    pub const ALL: [Self; 6] = [
        Self::Indoor,
        Self::Outdoor,
        Self::Succulents,
        Self::Flowering,
        Self::AirPurifying,
        Self::Planters,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Indoor => "Indoor Plants",
            Self::Outdoor => "Outdoor Plants",
            Self::Succulents => "Succulents & Cacti",
            Self::Flowering => "Flowering Plants",
            Self::AirPurifying => "Air Purifying",
            Self::Planters => "Planters & Pots",
        }
    }
}

/// How much attention a plant needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareLevel {
    Easy,
    Moderate,
    Expert,
}

/// A plant (or planter) sold by the shop.
///
/// Cart lines embed a clone of this record taken when the item was added,
/// so later catalog edits do not reprice existing carts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub scientific_name: String,
    pub category: PlantCategory,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub description: String,
    pub image: String,
    pub in_stock: bool,
    pub stock_quantity: u32,
    pub care_level: CareLevel,
    pub light: String,
    pub size: String,
    pub rating: f32,
    pub reviews: u32,
    pub featured: bool,
}

impl Plant {
    /// Whether `quantity` more units can be sold right now.
    #[must_use]
    pub const fn can_supply(&self, quantity: u32) -> bool {
        self.in_stock && self.stock_quantity >= quantity
    }
}
