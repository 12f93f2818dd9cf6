use agrointel_core::{ChatMessage, CropRecommendation, CropRecommendationInput, DiagnosisResult};
use async_trait::async_trait;

use crate::image::ImagePayload;
use crate::result::InferenceError;

/// Capability interface to the inference service.
///
/// One method per logical request. Implementations are stateless with respect
/// to the UI: they issue the call and validate the response, nothing else.
/// Swap [`GeminiClient`](crate::GeminiClient) for
/// [`StubInference`](crate::StubInference) in tests.
#[async_trait]
pub trait InferenceService: Send + Sync + 'static {
    /// Diagnose a crop photo.
    ///
    /// A response that fails field validation is `InferenceError::Malformed`;
    /// no partially populated diagnosis is ever returned.
    async fn detect_disease(&self, image: &ImagePayload) -> Result<DiagnosisResult, InferenceError>;

    /// Produce the assistant's reply to `text`, given the prior transcript.
    async fn chat(&self, history: &[ChatMessage], text: &str) -> Result<String, InferenceError>;

    /// Recommend a crop for the given soil and climate readings.
    async fn recommend_crop(
        &self,
        input: &CropRecommendationInput,
    ) -> Result<CropRecommendation, InferenceError>;
}
