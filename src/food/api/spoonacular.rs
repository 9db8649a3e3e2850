use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};

use super::{Nutrient, RecordStore, SearchHit};
use crate::error::StoreError;
use crate::food::config::FoodConfig;
use crate::models::RecordKind;

#[derive(Debug, Deserialize)]
struct IngredientSearch {
    #[serde(default)]
    results: Vec<IngredientResult>,
}

#[derive(Debug, Deserialize)]
struct IngredientResult {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecipeSearch {
    #[serde(default)]
    results: Vec<RecipeResult>,
}

#[derive(Debug, Deserialize)]
struct RecipeResult {
    id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct IngredientInformation {
    nutrition: Option<NutritionInfo>,
}

#[derive(Debug, Deserialize)]
struct NutritionInfo {
    #[serde(default)]
    nutrients: Vec<Nutrient>,
}

#[derive(Debug, Clone)]
pub struct SpoonacularClient {
    api_key: Option<String>,
    base_url: String,
    client: Client,
}

impl SpoonacularClient {
    pub fn new(config: &FoodConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            api_key: config.spoonacular_api_key.clone(),
            base_url: config.spoonacular_api_url.clone(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T, StoreError> {
        let api_key = self.api_key.as_deref().ok_or(StoreError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", api_key)])
            .query(params)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for SpoonacularClient {
    async fn search(&self, kind: RecordKind, query: &str, limit: usize) -> Result<Vec<SearchHit>, StoreError> {
        let params = [("query", query.to_string()), ("number", limit.to_string())];

        let hits = match kind {
            RecordKind::Nutrition => self
                .get_json::<IngredientSearch>("/food/ingredients/search", &params)
                .await?
                .results
                .into_iter()
                .map(|r| SearchHit { id: r.id, title: r.name })
                .collect::<Vec<_>>(),
            RecordKind::Recipe => self
                .get_json::<RecipeSearch>("/recipes/complexSearch", &params)
                .await?
                .results
                .into_iter()
                .map(|r| SearchHit { id: r.id, title: r.title })
                .collect::<Vec<_>>(),
        };

        tracing::debug!(kind = %kind, query = %query, hits = hits.len(), "Spoonacular search");
        Ok(hits)
    }

    async fn fetch_nutrients(&self, id: i64) -> Result<Vec<Nutrient>, StoreError> {
        let info: IngredientInformation = self
            .get_json(
                &format!("/food/ingredients/{}/information", id),
                &[("amount", "1".to_string())],
            )
            .await?;

        Ok(info.nutrition.map(|n| n.nutrients).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(api_key: Option<&str>) -> FoodConfig {
        FoodConfig {
            spoonacular_api_key: api_key.map(str::to_string),
            spoonacular_api_url: "http://127.0.0.1:9".to_string(),
            recipe_base_url: "https://spoonacular.com/recipes".to_string(),
            openfoodfacts_api_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_parse_ingredient_information() {
        let info: IngredientInformation = serde_json::from_str(
            r#"{"id":9040,"name":"banana","nutrition":{"nutrients":[
                {"name":"Calories","amount":105.02,"unit":"kcal","percentOfDailyNeeds":5.25},
                {"name":"Fat","amount":0.39,"unit":"g"}
            ]}}"#,
        )
        .unwrap();

        let nutrients = info.nutrition.unwrap().nutrients;
        assert_eq!(nutrients.len(), 2);
        assert_eq!(nutrients[0].name, "Calories");
        assert_eq!(nutrients[0].unit, "kcal");
    }

    #[test]
    fn test_parse_recipe_search_preserves_order() {
        let search: RecipeSearch = serde_json::from_str(
            r#"{"results":[{"id":2,"title":"Banana Bread","image":"x.jpg"},{"id":1,"title":"Banana Smoothie"}],
                "offset":0,"number":5,"totalResults":2}"#,
        )
        .unwrap();

        let titles: Vec<&str> = search.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Banana Bread", "Banana Smoothie"]);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_store_error() {
        let client = SpoonacularClient::new(&config(None)).unwrap();
        let err = client.search(RecordKind::Nutrition, "banana", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = SpoonacularClient::new(&config(Some("key"))).unwrap();
        let err = client.search(RecordKind::Recipe, "banana", 5).await.unwrap_err();
        assert!(matches!(err, StoreError::Network(_)));
    }
}
