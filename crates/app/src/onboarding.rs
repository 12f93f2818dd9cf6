//! First-run flow shown before the main app.

use thiserror::Error;

use crate::preferences::{Language, PreferencesHandle};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OnboardingStep {
    Welcome,
    Language,
    Benefits,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingError {
    #[error("cannot {action} on the {step:?} step")]
    WrongStep {
        action: &'static str,
        step: OnboardingStep,
    },
}

/// `Welcome → Language → Benefits → Done`. Each step has one way forward.
#[derive(Debug, Clone)]
pub struct Onboarding {
    step: OnboardingStep,
    preferences: PreferencesHandle,
}

impl Onboarding {
    pub fn new(preferences: PreferencesHandle) -> Self {
        Self {
            step: OnboardingStep::Welcome,
            preferences,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step == OnboardingStep::Done
    }

    pub fn proceed(&mut self) -> Result<OnboardingStep, OnboardingError> {
        self.require_step("continue", OnboardingStep::Welcome)?;
        self.step = OnboardingStep::Language;
        Ok(self.step)
    }

    /// Records the choice in the shared preferences.
    pub fn choose_language(&mut self, language: Language) -> Result<OnboardingStep, OnboardingError> {
        self.require_step("choose a language", OnboardingStep::Language)?;
        self.preferences.set_language(language);
        self.step = OnboardingStep::Benefits;
        Ok(self.step)
    }

    pub fn get_started(&mut self) -> Result<OnboardingStep, OnboardingError> {
        self.require_step("get started", OnboardingStep::Benefits)?;
        self.step = OnboardingStep::Done;
        tracing::info!("onboarding finished");
        Ok(self.step)
    }

    fn require_step(&self, action: &'static str, step: OnboardingStep) -> Result<(), OnboardingError> {
        if self.step == step {
            Ok(())
        } else {
            Err(OnboardingError::WrongStep {
                action,
                step: self.step,
            })
        }
    }
}
