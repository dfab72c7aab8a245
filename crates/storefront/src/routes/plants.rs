//! Catalog route handlers.

use axum::{Json, extract::State};
use greenhouse_core::PlantId;
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::models::Plant;
use crate::routes::{ApiPath, ApiQuery};
use crate::services::catalog::{CategorySummary, PlantPage, PlantQuery};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlantListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: PlantPage,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    pub success: bool,
    pub plant: Plant,
}

/// Plant listing with filters, sort and pagination.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PlantQuery>,
) -> Json<PlantListResponse> {
    Json(PlantListResponse {
        success: true,
        page: state.catalog().query(&query),
    })
}

/// Categories with plant counts.
pub async fn categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        success: true,
        categories: state.catalog().categories(),
    })
}

/// Plant detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PlantId>,
) -> Result<Json<PlantResponse>, AppError> {
    let plant = state
        .catalog()
        .find(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Plant not found".to_owned()))?;

    Ok(Json(PlantResponse {
        success: true,
        plant,
    }))
}
