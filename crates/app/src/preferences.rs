//! Process-wide display preferences.
//!
//! Seeded once at startup, changed only through [`PreferencesHandle::update`],
//! read by the render layer via [`PreferencesHandle::snapshot`].

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ml")]
    Malayalam,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Malayalam,
        Language::Tamil,
        Language::Hindi,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Malayalam => "ml",
            Language::Tamil => "ta",
            Language::Hindi => "hi",
        }
    }

    /// Name in the language itself, as listed in the picker.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Malayalam => "മലയാളം",
            Language::Tamil => "தமிழ்",
            Language::Hindi => "हिन्दी",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub language: Language,
}

/// Shared handle to the one `Preferences` value. Last writer wins.
#[derive(Debug, Clone, Default)]
pub struct PreferencesHandle {
    inner: Arc<RwLock<Preferences>>,
}

impl PreferencesHandle {
    pub fn new(initial: Preferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> Preferences {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// The only way to change preferences. Returns the new value.
    pub fn update(&self, change: impl FnOnce(&mut Preferences)) -> Preferences {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut guard);
        tracing::info!(theme = ?guard.theme, language = guard.language.code(), "preferences updated");
        *guard
    }

    pub fn toggle_theme(&self) -> Theme {
        self.update(|prefs| prefs.theme = prefs.theme.toggled()).theme
    }

    pub fn set_language(&self, language: Language) {
        self.update(|prefs| prefs.language = language);
    }
}
