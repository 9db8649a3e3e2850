use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::food::api::ProductSummary;
use crate::food::LookupOutcome;
use crate::models::{GroceryLabel, NutritionRecord, RecipeRecord};

#[derive(Debug, Deserialize, Validate)]
pub struct ItemQuery {
    #[validate(length(min = 1, max = 200))]
    pub item: String,
}

/// Recipe as the front-end consumes it; `instructions` links to the full recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeView {
    pub title: String,
    pub instructions: String,
}

impl From<RecipeRecord> for RecipeView {
    fn from(record: RecipeRecord) -> Self {
        Self {
            title: record.title,
            instructions: record.reference_url,
        }
    }
}

fn label_from_query(query: Result<Query<ItemQuery>, QueryRejection>) -> ApiResult<GroceryLabel> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    GroceryLabel::new(query.item).ok_or_else(|| ApiError::BadRequest("item must not be blank".to_string()))
}

/// GET /nutrition?item=<label>
pub async fn nutrition(
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult<Json<NutritionRecord>> {
    let label = label_from_query(query)?;

    match state.lookup.nutrition(&label).await? {
        LookupOutcome::Found(record) => Ok(Json(record)),
        LookupOutcome::NotFound => Err(ApiError::NotFound(format!("No nutrition data found for '{}'", label))),
    }
}

/// GET /recipes?item=<label>
pub async fn recipes(
    State(state): State<AppState>,
    query: Result<Query<ItemQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RecipeView>>> {
    let label = label_from_query(query)?;

    match state.lookup.recipes(&label).await? {
        LookupOutcome::Found(records) => Ok(Json(records.into_iter().map(RecipeView::from).collect())),
        LookupOutcome::NotFound => Err(ApiError::NotFound(format!("No recipes found for '{}'", label))),
    }
}

/// GET /barcode/:code
pub async fn barcode(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Json<ProductSummary>> {
    if !is_barcode(&code) {
        return Err(ApiError::BadRequest(format!("'{}' is not an 8-14 digit barcode", code)));
    }

    state
        .catalog
        .product(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No product found for barcode {}", code)))
}

fn is_barcode(code: &str) -> bool {
    (8..=14).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}
