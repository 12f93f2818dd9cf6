//! Deterministic in-process inference for tests and offline demos.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use agrointel_core::{
    ChatMessage, Confidence, CropRecommendation, CropRecommendationInput, DiagnosisResult,
    DiseaseFinding, Severity, TreatmentStep,
};
use async_trait::async_trait;

use crate::image::ImagePayload;
use crate::result::InferenceError;
use crate::service::InferenceService;

/// A request as seen by the stub, kept for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum StubRequest {
    Detect(ImagePayload),
    Chat { history_len: usize, text: String },
    Recommend(CropRecommendationInput),
}

/// `InferenceService` returning canned answers.
///
/// Scripted failures (see [`StubInference::fail_next`]) are consumed in order
/// by the next calls of any kind; once drained, calls succeed again.
#[derive(Debug, Default)]
pub struct StubInference {
    latency: Option<Duration>,
    failures: Mutex<VecDeque<InferenceError>>,
    requests: Mutex<Vec<StubRequest>>,
}

impl StubInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer (use with `tokio::time::pause` in tests).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: InferenceError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The diagnosis every successful detection returns.
    pub fn canned_diagnosis() -> DiagnosisResult {
        let finding = DiseaseFinding {
            name: "Leaf Spot".to_string(),
            treatment_steps: vec![
                TreatmentStep {
                    day: 1,
                    action: "Remove infected leaves".to_string(),
                    cost_estimate: Some("₹0".to_string()),
                },
                TreatmentStep {
                    day: 3,
                    action: "Apply fungicide".to_string(),
                    cost_estimate: Some("₹250".to_string()),
                },
            ],
        };
        DiagnosisResult::new(
            Some(finding),
            Confidence::clamped(85),
            Severity::Moderate,
            "Brown spots on leaves with yellow halos.",
            "Ensure good air circulation and avoid overhead watering.",
        )
        .unwrap_or_else(|_| unreachable!("canned diagnosis is valid"))
    }

    /// The recommendation every successful crop request returns.
    pub fn canned_recommendation(input: &CropRecommendationInput) -> CropRecommendation {
        CropRecommendation {
            recommended_crop: "Rice".to_string(),
            confidence: Confidence::clamped(88),
            reasoning: format!(
                "High rainfall ({} mm) and slightly acidic soil (pH {}) around {} suit paddy.",
                input.rainfall_mm(),
                input.ph(),
                input.location()
            ),
            tips: vec![
                "Transplant seedlings 20-25 days after sowing.".to_string(),
                "Keep 5 cm standing water during tillering.".to_string(),
                "Split nitrogen into three applications.".to_string(),
            ],
        }
    }

    async fn answer(&self, request: StubRequest) -> Result<(), InferenceError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InferenceService for StubInference {
    async fn detect_disease(&self, image: &ImagePayload) -> Result<DiagnosisResult, InferenceError> {
        self.answer(StubRequest::Detect(image.clone())).await?;
        Ok(Self::canned_diagnosis())
    }

    async fn chat(&self, history: &[ChatMessage], text: &str) -> Result<String, InferenceError> {
        self.answer(StubRequest::Chat {
            history_len: history.len(),
            text: text.to_string(),
        })
        .await?;
        Ok(format!(
            "About \"{text}\": watch the crop closely for a week and contact your Krishi Bhavan if it spreads."
        ))
    }

    async fn recommend_crop(
        &self,
        input: &CropRecommendationInput,
    ) -> Result<CropRecommendation, InferenceError> {
        self.answer(StubRequest::Recommend(input.clone())).await?;
        Ok(Self::canned_recommendation(input))
    }
}
