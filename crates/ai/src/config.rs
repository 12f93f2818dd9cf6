//! Inference service configuration.

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_CHAT_OUTPUT_TOKENS: u32 = 500;

/// Connection settings for the hosted model.
///
/// The API key is optional here on purpose: a missing key is reported per call
/// as `MissingCredentials` instead of preventing startup.
#[derive(Clone)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_chat_output_tokens: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_chat_output_tokens: DEFAULT_MAX_CHAT_OUTPUT_TOKENS,
        }
    }
}

impl InferenceConfig {
    /// Read `AGROINTEL_API_KEY` (or `GEMINI_API_KEY`), `AGROINTEL_MODEL` and
    /// `AGROINTEL_INFERENCE_URL`, falling back to defaults.
    pub fn from_env() -> Self {
        let api_key = std::env::var("AGROINTEL_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        if api_key.is_none() {
            tracing::warn!("AGROINTEL_API_KEY not set; inference requests will fail with missing credentials");
        }

        Self {
            api_key,
            model: std::env::var("AGROINTEL_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("AGROINTEL_INFERENCE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            max_chat_output_tokens: DEFAULT_MAX_CHAT_OUTPUT_TOKENS,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl core::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_chat_output_tokens", &self.max_chat_output_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_the_key() {
        let config = InferenceConfig::default().with_api_key("sk-very-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
