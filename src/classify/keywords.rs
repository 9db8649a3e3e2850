use crate::models::ConfirmationResult;

/// Category words and staples whose presence marks a description as grocery-related.
pub const GROCERY_KEYWORDS: &[&str] = &[
    "fruit", "vegetable", "meat", "bread", "cheese", "milk", "egg", "grain",
    "rice", "pasta", "cereal", "seafood", "fish", "poultry", "legume", "bean",
    "nut", "seed", "chocolate", "snack", "grocery", "food", "banana", "apple",
    "potato", "tomato",
];

/// Decides whether free-text descriptions name a grocery item by substring
/// matching against a fixed keyword set.
///
/// Matching is deliberately naive: "seedling" matches "seed", and a caption
/// describing a kumquat without any listed word is rejected.
#[derive(Debug, Clone)]
pub struct KeywordConfirmer {
    keywords: Vec<String>,
}

impl Default for KeywordConfirmer {
    fn default() -> Self {
        Self::new(GROCERY_KEYWORDS.iter().copied())
    }
}

impl KeywordConfirmer {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First candidate (in the given order) containing any keyword wins; the
    /// label keeps the candidate's original casing.
    pub fn confirm<S: AsRef<str>>(&self, candidates: &[S]) -> ConfirmationResult {
        for candidate in candidates {
            let text = candidate.as_ref();
            let lowered = text.to_lowercase();
            if let Some(keyword) = self.keywords.iter().find(|k| lowered.contains(k.as_str())) {
                tracing::info!(candidate = %text, keyword = %keyword, "Matched grocery keyword");
                return ConfirmationResult::matched(text, keyword);
            }
        }

        tracing::debug!(candidates = candidates.len(), "No grocery keyword matched");
        ConfirmationResult::unconfirmed()
    }
}
