//! Startup configuration.

use std::time::Duration;

use agrointel_ai::InferenceConfig;
use anyhow::{bail, Context};

use crate::preferences::{Language, Preferences, Theme};
use crate::runner::DEFAULT_TIMEOUT;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    /// Upper bound for one inference request.
    pub request_timeout: Duration,
    pub theme: Theme,
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            request_timeout: DEFAULT_TIMEOUT,
            theme: Theme::default(),
            language: Language::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// `AGROINTEL_TIMEOUT_SECS`, `AGROINTEL_THEME` and `AGROINTEL_LANG` are
    /// optional; a value that is present but malformed is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(InferenceConfig::from_env(), |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        inference: InferenceConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = Self {
            inference,
            ..Self::default()
        };

        if let Some(raw) = lookup("AGROINTEL_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("AGROINTEL_TIMEOUT_SECS must be a whole number of seconds (got {raw:?})"))?;
            if secs == 0 {
                bail!("AGROINTEL_TIMEOUT_SECS must be greater than zero");
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("AGROINTEL_THEME") {
            config.theme = Theme::parse(&raw)
                .with_context(|| format!("AGROINTEL_THEME must be `light` or `dark` (got {raw:?})"))?;
        }

        if let Some(raw) = lookup("AGROINTEL_LANG") {
            config.language = Language::from_code(&raw)
                .with_context(|| format!("AGROINTEL_LANG must be one of en, ml, ta, hi (got {raw:?})"))?;
        }

        Ok(config)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            theme: self.theme,
            language: self.language,
        }
    }
}
