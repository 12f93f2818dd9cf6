//! Executes inference requests off the UI path and reports back by token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agrointel_ai::{ImagePayload, InferenceError, InferenceService};
use agrointel_core::{
    ChatMessage, CropRecommendation, CropRecommendationInput, DiagnosisResult, ErrorKind,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::task::RequestToken;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one request, addressed to the task that issued it.
#[derive(Debug, Clone)]
pub enum Completion {
    Detection {
        token: RequestToken,
        outcome: Result<DiagnosisResult, ErrorKind>,
    },
    Chat {
        token: RequestToken,
        outcome: Result<String, ErrorKind>,
    },
    Recommendation {
        token: RequestToken,
        outcome: Result<CropRecommendation, ErrorKind>,
    },
}

impl Completion {
    pub fn token(&self) -> RequestToken {
        match self {
            Completion::Detection { token, .. }
            | Completion::Chat { token, .. }
            | Completion::Recommendation { token, .. } => *token,
        }
    }

    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            Completion::Detection { outcome, .. } => outcome.as_ref().err().copied(),
            Completion::Chat { outcome, .. } => outcome.as_ref().err().copied(),
            Completion::Recommendation { outcome, .. } => outcome.as_ref().err().copied(),
        }
    }
}

/// Spawns one tokio task per request, bounded by a timeout.
///
/// The runner holds no workflow state. Whoever owns the receiver decides
/// whether a completion still matters.
#[derive(Clone)]
pub struct InferenceRunner {
    service: Arc<dyn InferenceService>,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Completion>,
}

impl InferenceRunner {
    pub fn new(
        service: Arc<dyn InferenceService>,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                service,
                timeout,
                tx,
            },
            rx,
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn detect(&self, token: RequestToken, image: ImagePayload) -> JoinHandle<()> {
        let service = self.service.clone();
        self.spawn(
            "detect_disease",
            token,
            async move { service.detect_disease(&image).await },
            |token, outcome| Completion::Detection { token, outcome },
        )
    }

    pub fn chat(&self, token: RequestToken, history: Vec<ChatMessage>, text: String) -> JoinHandle<()> {
        let service = self.service.clone();
        self.spawn(
            "chat",
            token,
            async move { service.chat(&history, &text).await },
            |token, outcome| Completion::Chat { token, outcome },
        )
    }

    pub fn recommend(&self, token: RequestToken, input: CropRecommendationInput) -> JoinHandle<()> {
        let service = self.service.clone();
        self.spawn(
            "recommend_crop",
            token,
            async move { service.recommend_crop(&input).await },
            |token, outcome| Completion::Recommendation { token, outcome },
        )
    }

    fn spawn<T, Fut>(
        &self,
        request: &'static str,
        token: RequestToken,
        call: Fut,
        wrap: fn(RequestToken, Result<T, ErrorKind>) -> Completion,
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, InferenceError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        let bound = self.timeout;
        let span = tracing::info_span!("inference", request, %token);

        tokio::spawn(
            async move {
                tracing::debug!("request sent");
                let outcome = match tokio::time::timeout(bound, call).await {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "inference request failed");
                        Err(err.kind())
                    }
                    Err(_) => {
                        let err = InferenceError::Timeout(bound);
                        tracing::warn!(error = %err, "inference request timed out");
                        Err(err.kind())
                    }
                };
                if tx.send(wrap(token, outcome)).is_err() {
                    tracing::debug!("completion receiver dropped");
                }
            }
            .instrument(span),
        )
    }
}

impl core::fmt::Debug for InferenceRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InferenceRunner")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
