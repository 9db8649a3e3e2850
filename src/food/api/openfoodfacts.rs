use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::food::config::FoodConfig;

const UNKNOWN: &str = "UNKNOWN";

/// Packaged-product facts for a scanned barcode, per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub barcode: String,
    pub name: String,
    pub energy_kj: Option<i64>,
    pub sugars_g: Option<f64>,
    pub proteins_g: Option<f64>,
    pub nova_group: String,
    pub nutriscore_grade: String,
    pub ecoscore_grade: String,
    /// Only filled in when none of the headline nutrients are known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `Ok(None)` when the catalog has no product for this barcode.
    async fn product(&self, barcode: &str) -> Result<Option<ProductSummary>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    base_url: String,
    client: Client,
}

impl OpenFoodFactsClient {
    pub fn new(config: &FoodConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(concat!("grocery-lens/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.openfoodfacts_api_url.clone(),
            client,
        })
    }

    fn summarize(barcode: &str, data: &Value) -> Option<ProductSummary> {
        if data.get("status").and_then(|s| s.as_i64()) != Some(1) {
            return None;
        }
        let product = data.get("product")?;
        let nutriments = product.get("nutriments").cloned().unwrap_or(Value::Null);

        let energy_kj = ["energy-kj_value_computed", "energy-kj", "energy_100g"]
            .iter()
            .find_map(|key| number(&nutriments, key))
            .map(|e| e.round() as i64);
        let sugars_g = number(&nutriments, "sugars_100g");
        let proteins_g = number(&nutriments, "proteins_100g");

        let ingredients = if energy_kj.is_none() && sugars_g.is_none() && proteins_g.is_none() {
            Some(
                text(product, "ingredients_text")
                    .unwrap_or_else(|| "Ingredients not available.".to_string()),
            )
        } else {
            None
        };

        Some(ProductSummary {
            barcode: barcode.to_string(),
            name: text(product, "product_name").unwrap_or_else(|| "Unknown Product".to_string()),
            energy_kj,
            sugars_g,
            proteins_g,
            nova_group: text(product, "nova_group").unwrap_or_else(|| "Unknown".to_string()),
            nutriscore_grade: text(product, "nutriscore_grade")
                .map(|g| g.to_uppercase())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            ecoscore_grade: text(product, "ecoscore_grade")
                .map(|g| g.to_uppercase())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            ingredients,
        })
    }
}

#[async_trait]
impl ProductCatalog for OpenFoodFactsClient {
    async fn product(&self, barcode: &str) -> Result<Option<ProductSummary>, StoreError> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        // Unknown barcodes come back as 404 with a `status: 0` body
        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status(status.as_u16(), body));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        let summary = Self::summarize(barcode, &data);
        tracing::debug!(barcode = %barcode, found = summary.is_some(), "Open Food Facts lookup");
        Ok(summary)
    }
}

/// Open Food Facts mixes numbers and numeric strings in the same fields.
fn number(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
