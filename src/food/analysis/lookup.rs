//! Name-based nutrition and recipe lookup with a single last-token retry.
//!
//! Vision and caption labels are often descriptive phrases ("ripe saba banana")
//! while the store indexes plain nouns, so an empty search is retried once with
//! the label's last word. The heuristic is purely positional: "a red apple on a
//! table" relaxes to "table".

use std::sync::Arc;

use super::nutrition::{nutrition_record, recipe_record};
use crate::error::StoreError;
use crate::food::api::{RecordStore, SearchHit};
use crate::models::{GroceryLabel, LookupQuery, NutritionRecord, RecipeRecord, RecordKind};

/// Store reached; the record either exists or does not. Store failures travel
/// separately as `StoreError`.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome<T> {
    Found(T),
    NotFound,
}

impl<T> LookupOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LookupOutcome<U> {
        match self {
            LookupOutcome::Found(v) => LookupOutcome::Found(f(v)),
            LookupOutcome::NotFound => LookupOutcome::NotFound,
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            LookupOutcome::Found(v) => Some(v),
            LookupOutcome::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FoodRecord {
    Nutrition(NutritionRecord),
    Recipes(Vec<RecipeRecord>),
}

pub struct QueryRelaxationLookup {
    store: Arc<dyn RecordStore>,
    recipe_base_url: String,
}

impl QueryRelaxationLookup {
    pub fn new(store: Arc<dyn RecordStore>, recipe_base_url: impl Into<String>) -> Self {
        Self {
            store,
            recipe_base_url: recipe_base_url.into(),
        }
    }

    pub async fn lookup(&self, label: &GroceryLabel, kind: RecordKind) -> Result<LookupOutcome<FoodRecord>, StoreError> {
        match kind {
            RecordKind::Nutrition => Ok(self.nutrition(label).await?.map(FoodRecord::Nutrition)),
            RecordKind::Recipe => Ok(self.recipes(label).await?.map(FoodRecord::Recipes)),
        }
    }

    /// Resolves the label to an ingredient, then fetches that ingredient's nutrients.
    pub async fn nutrition(&self, label: &GroceryLabel) -> Result<LookupOutcome<NutritionRecord>, StoreError> {
        let Some(hits) = self.search_relaxed(label, RecordKind::Nutrition).await? else {
            return Ok(LookupOutcome::NotFound);
        };
        let Some(item) = hits.first() else {
            return Ok(LookupOutcome::NotFound);
        };

        let nutrients = self.store.fetch_nutrients(item.id).await?;
        tracing::info!(label = %label, item = %item.title, nutrients = nutrients.len(), "Nutrition resolved");
        Ok(LookupOutcome::Found(nutrition_record(&nutrients)))
    }

    pub async fn recipes(&self, label: &GroceryLabel) -> Result<LookupOutcome<Vec<RecipeRecord>>, StoreError> {
        let Some(hits) = self.search_relaxed(label, RecordKind::Recipe).await? else {
            return Ok(LookupOutcome::NotFound);
        };

        let recipes: Vec<RecipeRecord> = hits
            .iter()
            .map(|hit| recipe_record(&self.recipe_base_url, hit))
            .collect();
        tracing::info!(label = %label, recipes = recipes.len(), "Recipes resolved");
        Ok(LookupOutcome::Found(recipes))
    }

    /// Full phrase first, then at most one retry with the last token.
    /// `None` means both searches came back empty.
    async fn search_relaxed(&self, label: &GroceryLabel, kind: RecordKind) -> Result<Option<Vec<SearchHit>>, StoreError> {
        let mut query = LookupQuery::new(label.as_str());
        let limit = kind.search_limit();

        let hits = self.store.search(kind, &query.original, limit).await?;
        if !hits.is_empty() {
            return Ok(Some(hits));
        }

        let Some(relaxed) = query.relax().map(str::to_owned) else {
            tracing::info!(kind = %kind, query = %query.original, "No records found");
            return Ok(None);
        };

        tracing::debug!(kind = %kind, original = %query.original, relaxed = %relaxed, "Relaxing query");
        let hits = self.store.search(kind, &relaxed, limit).await?;
        if hits.is_empty() {
            tracing::info!(kind = %kind, query = %query.original, relaxed = %relaxed, "No records found");
            return Ok(None);
        }
        Ok(Some(hits))
    }
}
