use async_trait::async_trait;

use crate::error::ProviderError;
use crate::models::{ImageHandle, ProviderKind, RecognitionCandidate};

/// A remote recognition capability that turns an image into text candidates.
///
/// Implementations are built once at startup and shared across requests, so
/// they must not mutate their configuration per call.
#[async_trait]
pub trait ClassificationProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn classify(&self, image: &ImageHandle) -> Result<Vec<RecognitionCandidate>, ProviderError>;
}
