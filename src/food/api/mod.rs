pub mod openfoodfacts;
pub mod spoonacular;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::StoreError;
use crate::models::RecordKind;

// Re-export common types
pub use openfoodfacts::{OpenFoodFactsClient, ProductCatalog, ProductSummary};
pub use spoonacular::SpoonacularClient;

/// One row of a store search: the item's identifier and display name.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Keyed nutrition/recipe database queried by name.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Top `limit` matches for `query`, most relevant first.
    async fn search(&self, kind: RecordKind, query: &str, limit: usize) -> Result<Vec<SearchHit>, StoreError>;

    /// Nutrient breakdown for an ingredient found by `search`.
    async fn fetch_nutrients(&self, id: i64) -> Result<Vec<Nutrient>, StoreError>;
}
