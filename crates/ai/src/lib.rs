//! `agrointel-ai`
//!
//! **Responsibility:** boundary to the external generative-AI inference service.
//!
//! This crate is intentionally **not** part of the client state machines:
//! - It must not hold workflow or view state.
//! - Every call is a single request/response; lifecycles live in `agrointel-app`.
//! - Failures are returned as [`InferenceError`], never panics.

pub mod config;
pub mod gemini;
pub mod image;
pub mod prompt;
pub mod response;
pub mod result;
pub mod service;
pub mod stub;

pub use config::InferenceConfig;
pub use gemini::GeminiClient;
pub use image::ImagePayload;
pub use result::InferenceError;
pub use service::InferenceService;
pub use stub::StubInference;
