//! Catalog listing query: filters compose with AND, then sort, then paginate.

use greenhouse_core::Price;
use serde::{Deserialize, Serialize};

use crate::models::{CareLevel, Plant, PlantCategory};

const DEFAULT_LIMIT: u32 = 12;
const MAX_LIMIT: u32 = 100;

/// Sort order for catalog listings. Without one, catalog order is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantSort {
    PriceAsc,
    PriceDesc,
    Name,
    Rating,
    /// Catalog order.
    Newest,
}

/// Query-string parameters of `GET /plants`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlantQuery {
    pub category: Option<PlantCategory>,
    pub search: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub in_stock: Option<bool>,
    pub care_level: Option<CareLevel>,
    pub featured: Option<bool>,
    pub sort: Option<PlantSort>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One page of listing results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantPage {
    pub plants: Vec<Plant>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl PlantQuery {
    fn matches(&self, plant: &Plant, needle: Option<&str>) -> bool {
        self.category.is_none_or(|c| plant.category == c)
            && self.care_level.is_none_or(|c| plant.care_level == c)
            && self.in_stock.is_none_or(|s| plant.in_stock == s)
            && self.featured.is_none_or(|f| plant.featured == f)
            && self.min_price.is_none_or(|min| plant.price >= min)
            && self.max_price.is_none_or(|max| plant.price <= max)
            && needle.is_none_or(|n| {
                plant.name.to_lowercase().contains(n)
                    || plant.scientific_name.to_lowercase().contains(n)
                    || plant.description.to_lowercase().contains(n)
            })
    }

    pub(super) fn run(&self, plants: &[Plant]) -> PlantPage {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matched: Vec<&Plant> = plants
            .iter()
            .filter(|plant| self.matches(plant, needle.as_deref()))
            .collect();

        match self.sort {
            Some(PlantSort::PriceAsc) => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(PlantSort::PriceDesc) => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            Some(PlantSort::Name) => matched.sort_by(|a, b| a.name.cmp(&b.name)),
            Some(PlantSort::Rating) => matched.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            Some(PlantSort::Newest) | None => {}
        }

        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let total = matched.len();
        let total_pages = u32::try_from(total.div_ceil(limit as usize)).unwrap_or(u32::MAX);
        let offset = (page as usize - 1).saturating_mul(limit as usize);

        PlantPage {
            plants: matched
                .into_iter()
                .skip(offset)
                .take(limit as usize)
                .cloned()
                .collect(),
            total,
            page,
            limit,
            total_pages,
        }
    }
}
