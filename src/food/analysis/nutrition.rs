use crate::food::api::{Nutrient, SearchHit};
use crate::models::{NutritionRecord, RecipeRecord};

/// Maps each nutrient name to `"<amount> <unit>"`, values passed through as-is.
pub fn nutrition_record(nutrients: &[Nutrient]) -> NutritionRecord {
    nutrients
        .iter()
        .map(|n| (n.name.clone(), format!("{} {}", n.amount, n.unit)))
        .collect()
}

/// `<base>/<title with spaces replaced by hyphens>-<id>`
pub fn recipe_record(base_url: &str, hit: &SearchHit) -> RecipeRecord {
    RecipeRecord {
        title: hit.title.clone(),
        reference_url: format!("{}/{}-{}", base_url, hit.title.replace(' ', "-"), hit.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrition_record_formats_amount_and_unit() {
        let record = nutrition_record(&[
            Nutrient { name: "Calories".to_string(), amount: 105.02, unit: "kcal".to_string() },
            Nutrient { name: "Fat".to_string(), amount: 0.0, unit: "g".to_string() },
        ]);
        assert_eq!(record.get("Calories").map(String::as_str), Some("105.02 kcal"));
        assert_eq!(record.get("Fat").map(String::as_str), Some("0 g"));
    }

    #[test]
    fn test_recipe_reference_url() {
        let hit = SearchHit { id: 715497, title: "Berry Banana Breakfast Smoothie".to_string() };
        let record = recipe_record("https://spoonacular.com/recipes", &hit);
        assert_eq!(
            record.reference_url,
            "https://spoonacular.com/recipes/Berry-Banana-Breakfast-Smoothie-715497"
        );
        assert_eq!(record.title, "Berry Banana Breakfast Smoothie");
    }
}
