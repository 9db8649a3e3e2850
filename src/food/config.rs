use std::env;
use std::time::Duration;

use crate::config::{non_empty_var, number_var, validated_url, ConfigError};

const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub spoonacular_api_key: Option<String>,
    pub spoonacular_api_url: String,
    pub recipe_base_url: String,
    pub openfoodfacts_api_url: String,
    pub timeout: Duration,
}

impl FoodConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = |name: &str, default: &str| {
            validated_url(name, env::var(name).unwrap_or_else(|_| default.to_string()))
        };

        Ok(Self {
            spoonacular_api_key: non_empty_var("SPOONACULAR_API_KEY"),
            spoonacular_api_url: url("SPOONACULAR_API_URL", "https://api.spoonacular.com")?,
            recipe_base_url: url("SPOONACULAR_RECIPE_BASE_URL", "https://spoonacular.com/recipes")?,
            openfoodfacts_api_url: url("OPENFOODFACTS_API_URL", "https://world.openfoodfacts.org")?,
            timeout: Duration::from_secs(number_var("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)?),
        })
    }
}
