//! Read-only plant catalog.
//!
//! The cart resolves items through the [`Catalog`] trait; the dashboard uses
//! it for the product count. [`StaticCatalog`] serves the seeded inventory and
//! also answers the listing query behind `GET /plants`.

mod query;
mod seed;

pub use query::{PlantPage, PlantQuery, PlantSort};

use async_trait::async_trait;
use greenhouse_core::PlantId;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Plant, PlantCategory};

/// Errors surfaced by a catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing store could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of catalog records by identifier.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolve a plant by id; `Ok(None)` when it does not exist.
    async fn get(&self, id: &PlantId) -> Result<Option<Plant>, CatalogError>;

    /// Number of plants listed.
    async fn count(&self) -> Result<usize, CatalogError>;
}

/// Category with the number of plants filed under it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: PlantCategory,
    pub name: &'static str,
    pub count: usize,
}

/// In-process catalog over a fixed list of plants.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    plants: Vec<Plant>,
}

impl StaticCatalog {
    /// Catalog over the given plants, kept in the given order.
    #[must_use]
    pub const fn new(plants: Vec<Plant>) -> Self {
        Self { plants }
    }

    /// Catalog over the shop's standard inventory.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(seed::plants())
    }

    /// Find a plant by id.
    #[must_use]
    pub fn find(&self, id: &PlantId) -> Option<&Plant> {
        self.plants.iter().find(|plant| &plant.id == id)
    }

    /// Filter, sort and paginate the catalog.
    #[must_use]
    pub fn query(&self, query: &PlantQuery) -> PlantPage {
        query.run(&self.plants)
    }

    /// Every category with its plant count, including empty ones.
    #[must_use]
    pub fn categories(&self) -> Vec<CategorySummary> {
        PlantCategory::ALL
            .into_iter()
            .map(|category| CategorySummary {
                id: category,
                name: category.label(),
                count: self
                    .plants
                    .iter()
                    .filter(|plant| plant.category == category)
                    .count(),
            })
            .collect()
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn get(&self, id: &PlantId) -> Result<Option<Plant>, CatalogError> {
        Ok(self.find(id).cloned())
    }

    async fn count(&self) -> Result<usize, CatalogError> {
        Ok(self.plants.len())
    }
}
