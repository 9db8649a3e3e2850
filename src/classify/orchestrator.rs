//! Ordered fallback chain over the classification providers.
//!
//! Stage 1 asks the web-entity provider, stage 2 the (slower) caption provider,
//! and if neither confirms a grocery item the result is `Unconfirmed`. Provider
//! faults are logged and treated as "no data"; they never escape `classify`.

use std::sync::Arc;
use std::time::Duration;

use crate::classify::keywords::KeywordConfirmer;
use crate::error::ProviderError;
use crate::models::{GroceryLabel, ImageHandle, ProviderKind, RecognitionCandidate};
use crate::providers::traits::ClassificationProvider;

/// Label shown to callers when no stage confirmed a grocery item.
pub const UNCONFIRMED_LABEL: &str = "Not a valid grocery item";

/// Used when a confirmed web-entity match carries no usable text.
pub const GENERIC_GROCERY_LABEL: &str = "Grocery Item";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Confirmed {
        label: GroceryLabel,
        matched_keyword: Option<String>,
        source: ProviderKind,
    },
    Unconfirmed,
}

impl Classification {
    pub fn label(&self) -> Option<&GroceryLabel> {
        match self {
            Classification::Confirmed { label, .. } => Some(label),
            Classification::Unconfirmed => None,
        }
    }

    /// What the response surface shows under `detected_objects`.
    pub fn display_label(&self) -> &str {
        match self {
            Classification::Confirmed { label, .. } => label.as_str(),
            Classification::Unconfirmed => UNCONFIRMED_LABEL,
        }
    }
}

pub struct ClassificationOrchestrator {
    primary: Arc<dyn ClassificationProvider>,
    secondary: Arc<dyn ClassificationProvider>,
    confirmer: KeywordConfirmer,
    stage_timeout: Duration,
}

impl ClassificationOrchestrator {
    pub fn new(
        primary: Arc<dyn ClassificationProvider>,
        secondary: Arc<dyn ClassificationProvider>,
        confirmer: KeywordConfirmer,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            confirmer,
            stage_timeout,
        }
    }

    pub async fn classify(&self, image: &ImageHandle) -> Classification {
        if let Some(candidates) = self.attempt(self.primary.as_ref(), image).await {
            if let Some(classification) = self.confirm_ranked(&candidates) {
                return classification;
            }
        }

        if let Some(candidates) = self.attempt(self.secondary.as_ref(), image).await {
            if let Some(classification) = self.confirm_caption(&candidates) {
                return classification;
            }
        }

        tracing::info!(image = %image.path().display(), "No stage confirmed a grocery item");
        Classification::Unconfirmed
    }

    /// Runs one provider under the stage timeout. Any failure becomes `None`.
    async fn attempt(
        &self,
        provider: &dyn ClassificationProvider,
        image: &ImageHandle,
    ) -> Option<Vec<RecognitionCandidate>> {
        let kind = provider.kind();
        let outcome = match tokio::time::timeout(self.stage_timeout, provider.classify(image)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.stage_timeout)),
        };

        match outcome {
            Ok(candidates) => {
                tracing::debug!(provider = %kind, candidates = candidates.len(), "Provider returned candidates");
                Some(candidates)
            }
            Err(e) => {
                tracing::warn!(provider = %kind, error = %e, "Provider unavailable, falling through");
                None
            }
        }
    }

    fn confirm_ranked(&self, candidates: &[RecognitionCandidate]) -> Option<Classification> {
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let result = self.confirmer.confirm(&texts);
        if !result.confirmed {
            return None;
        }

        let top_ranked = candidates
            .iter()
            .min_by_key(|c| c.rank.unwrap_or(u32::MAX))
            .map(|c| c.text.clone());

        let label = result
            .label
            .and_then(GroceryLabel::new)
            .or_else(|| top_ranked.and_then(GroceryLabel::new))
            .or_else(|| GroceryLabel::new(GENERIC_GROCERY_LABEL))?;

        Some(Classification::Confirmed {
            label,
            matched_keyword: result.matched_keyword,
            source: ProviderKind::WebEntity,
        })
    }

    /// The caption stage consults exactly one caption: the first one returned.
    fn confirm_caption(&self, candidates: &[RecognitionCandidate]) -> Option<Classification> {
        let caption = candidates.first()?;
        let result = self.confirmer.confirm(&[caption.text.as_str()]);
        if !result.confirmed {
            return None;
        }

        Some(Classification::Confirmed {
            label: GroceryLabel::new(caption.text.clone())?,
            matched_keyword: result.matched_keyword,
            source: ProviderKind::Caption,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Script {
        Answer(Vec<&'static str>),
        Fail,
        Hang,
    }

    struct ScriptedProvider {
        kind: ProviderKind,
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(kind: ProviderKind, script: Script) -> Arc<Self> {
            Arc::new(Self {
                kind,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClassificationProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn classify(&self, _image: &ImageHandle) -> Result<Vec<RecognitionCandidate>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Answer(texts) => Ok(texts
                    .iter()
                    .enumerate()
                    .map(|(i, t)| RecognitionCandidate::new(self.kind, *t, Some(i as u32)))
                    .collect()),
                Script::Fail => Err(ProviderError::Unauthenticated("no key".to_string())),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn orchestrator(
        primary: &Arc<ScriptedProvider>,
        secondary: &Arc<ScriptedProvider>,
    ) -> ClassificationOrchestrator {
        ClassificationOrchestrator::new(
            primary.clone(),
            secondary.clone(),
            KeywordConfirmer::default(),
            Duration::from_millis(200),
        )
    }

    fn image() -> ImageHandle {
        ImageHandle::new("uploads/test.jpg")
    }

    #[tokio::test]
    async fn test_primary_confirmation_skips_caption() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Answer(vec!["Saba banana", "Plantain"]));
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Answer(vec!["a banana"]));

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result.display_label(), "Saba banana");
        assert!(matches!(result, Classification::Confirmed { source: ProviderKind::WebEntity, .. }));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_through_to_caption_once() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Fail);
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Answer(vec!["a red apple on a table"]));

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result.display_label(), "a red apple on a table");
        match &result {
            Classification::Confirmed { matched_keyword, source, .. } => {
                assert_eq!(matched_keyword.as_deref(), Some("apple"));
                assert_eq!(*source, ProviderKind::Caption);
            }
            Classification::Unconfirmed => panic!("expected confirmation"),
        }
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_unconfirmed_falls_through_to_caption_once() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Answer(vec!["Desk", "Lamp"]));
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Answer(vec!["a loaf of bread"]));

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result.display_label(), "a loaf of bread");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_timeout_is_a_fallthrough() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Hang);
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Answer(vec!["fresh fish"]));

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result.display_label(), "fresh fish");
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_stages_unconfirmed_returns_sentinel() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Answer(vec!["Laptop"]));
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Answer(vec!["a laptop on a desk"]));

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result, Classification::Unconfirmed);
        assert!(result.label().is_none());
        assert_eq!(result.display_label(), UNCONFIRMED_LABEL);
    }

    #[tokio::test]
    async fn test_both_stages_failing_returns_sentinel() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Fail);
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Fail);

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result, Classification::Unconfirmed);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_caption_is_unconfirmed() {
        let primary = ScriptedProvider::new(ProviderKind::WebEntity, Script::Answer(vec![]));
        let secondary = ScriptedProvider::new(ProviderKind::Caption, Script::Answer(vec![""]));

        let result = orchestrator(&primary, &secondary).classify(&image()).await;

        assert_eq!(result, Classification::Unconfirmed);
    }
}
