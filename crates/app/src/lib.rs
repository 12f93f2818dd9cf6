//! `agrointel-app`
//!
//! **Responsibility:** client core of the farm-assistant app.
//!
//! This crate provides:
//! - Request lifecycles (`AsyncTask`) with stale-response protection
//! - Capture → analyze → review workflows for disease detection and crop recommendation
//! - Chat sessions, view routing, preferences and onboarding
//! - An `AppShell` that owns the active view's session and applies inference completions
//!
//! Rendering is left to whatever UI layer sits on top.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod crop_form;
pub mod onboarding;
pub mod preferences;
pub mod router;
pub mod runner;
pub mod shell;
pub mod task;
pub mod workflow;

pub use catalog::{CommunityPost, Farm, FarmDirectory, StaticCatalog};
pub use chat::{ChatError, ChatSession, ChatTurn};
pub use config::AppConfig;
pub use crop_form::{Advance, CropDoctorSession, CropForm, Field, FormError, FormStep, SessionError};
pub use onboarding::{Onboarding, OnboardingError, OnboardingStep};
pub use preferences::{Language, Preferences, PreferencesHandle, Theme};
pub use router::{ViewRouter, ViewState};
pub use runner::{Completion, InferenceRunner};
pub use shell::{AppShell, Session, ShellError};
pub use task::{AsyncTask, Delivery, RequestToken, TaskError, TaskState};
pub use workflow::{DetectionWorkflow, RecommendationWorkflow, Stage, Submission, Workflow, WorkflowError};
