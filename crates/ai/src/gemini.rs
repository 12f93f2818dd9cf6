//! HTTP client for the hosted Gemini `generateContent` endpoint.

use agrointel_core::{ChatMessage, CropRecommendation, CropRecommendationInput, DiagnosisResult, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;
use crate::image::ImagePayload;
use crate::prompt;
use crate::response::parse_json;
use crate::result::InferenceError;
use crate::service::InferenceService;

const JSON_MIME: &str = "application/json";

/// `InferenceService` backed by the Gemini REST API.
pub struct GeminiClient {
    config: InferenceConfig,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: &'a str, data: String },
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Issue one `generateContent` call and return the concatenated candidate text.
    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, InferenceError> {
        // Checked per call so a missing key is a visible failure, not a startup crash.
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(InferenceError::MissingCredentials)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        tracing::debug!(model = %self.config.model, "sending generateContent request");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "inference API returned an error");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = resp.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InferenceError::malformed("response contained no text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl InferenceService for GeminiClient {
    async fn detect_disease(&self, image: &ImagePayload) -> Result<DiagnosisResult, InferenceError> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::InlineData {
                        mime_type: image.mime_type(),
                        data: image.to_base64(),
                    },
                    Part::Text(prompt::DETECTION_PROMPT),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some(JSON_MIME),
                ..Default::default()
            },
        };
        let text = self.generate(&request).await?;
        parse_json(&text)
    }

    async fn chat(&self, history: &[ChatMessage], text: &str) -> Result<String, InferenceError> {
        // The API requires the conversation to open with a user turn, so the
        // local greeting (and anything else before the first user message) is dropped.
        let mut contents: Vec<Content<'_>> = history
            .iter()
            .skip_while(|m| m.role != Role::User)
            .map(|m| Content {
                role: Some(match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                }),
                parts: vec![Part::Text(&m.content)],
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part::Text(text)],
        });

        let request = GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text(prompt::CHAT_INSTRUCTION)],
            }),
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: Some(self.config.max_chat_output_tokens),
                ..Default::default()
            },
        };
        let reply = self.generate(&request).await?;
        Ok(reply.trim().to_string())
    }

    async fn recommend_crop(
        &self,
        input: &CropRecommendationInput,
    ) -> Result<CropRecommendation, InferenceError> {
        let prompt = prompt::crop_recommendation(input);
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part::Text(&prompt)],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some(JSON_MIME),
                ..Default::default()
            },
        };
        let text = self.generate(&request).await?;
        parse_json(&text)
    }
}
