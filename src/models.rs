use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Reference to an uploaded image on disk. Providers only ever read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    path: PathBuf,
}

impl ImageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    WebEntity,
    Caption,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::WebEntity => write!(f, "web_entity"),
            ProviderKind::Caption => write!(f, "caption"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionCandidate {
    pub source: ProviderKind,
    pub text: String,
    pub rank: Option<u32>,
}

impl RecognitionCandidate {
    pub fn new(source: ProviderKind, text: impl Into<String>, rank: Option<u32>) -> Self {
        Self {
            source,
            text: text.into(),
            rank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfirmationResult {
    pub confirmed: bool,
    pub label: Option<String>,
    pub matched_keyword: Option<String>,
}

impl ConfirmationResult {
    pub fn unconfirmed() -> Self {
        Self::default()
    }

    pub fn matched(label: &str, keyword: &str) -> Self {
        Self {
            confirmed: true,
            label: Some(label.to_string()),
            matched_keyword: Some(keyword.to_string()),
        }
    }
}

/// A confirmed grocery name. Never empty; keeps the provider's casing for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroceryLabel(String);

impl GroceryLabel {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for matching.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for GroceryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Search phrase for the record store plus its last-token fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub original: String,
    pub relaxed: Option<String>,
}

impl LookupQuery {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            relaxed: None,
        }
    }

    /// Narrows the query to its last whitespace-delimited token. Returns `None`
    /// when that token is the whole query, since retrying it would repeat the search.
    pub fn relax(&mut self) -> Option<&str> {
        let original = self.original.trim();
        let last = original.split_whitespace().last()?;
        if last == original {
            return None;
        }
        self.relaxed = Some(last.to_string());
        self.relaxed.as_deref()
    }
}

/// Nutrient name to `"<amount> <unit>"`.
pub type NutritionRecord = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRecord {
    pub title: String,
    pub reference_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Nutrition,
    Recipe,
}

impl RecordKind {
    /// How many matches to request from the store per query.
    pub fn search_limit(&self) -> usize {
        match self {
            RecordKind::Nutrition => 1,
            RecordKind::Recipe => 5,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Nutrition => write!(f, "nutrition"),
            RecordKind::Recipe => write!(f, "recipe"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relax_takes_last_token() {
        let mut query = LookupQuery::new("ripe saba banana");
        assert_eq!(query.relax(), Some("banana"));
        assert_eq!(query.relaxed.as_deref(), Some("banana"));
    }

    #[test]
    fn test_relax_single_token_has_no_fallback() {
        let mut query = LookupQuery::new("banana");
        assert_eq!(query.relax(), None);
        assert!(query.relaxed.is_none());
    }

    #[test]
    fn test_grocery_label_rejects_blank() {
        assert!(GroceryLabel::new("   ").is_none());
        let label = GroceryLabel::new("Red Apple").unwrap();
        assert_eq!(label.as_str(), "Red Apple");
        assert_eq!(label.normalized(), "red apple");
    }
}
