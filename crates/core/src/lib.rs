//! `agrointel-core`: domain values shared by the inference boundary and the client core.
//!
//! This crate contains **pure values** (no IO, no async, no clocks other than
//! message timestamps).

pub mod chat;
pub mod crop;
pub mod diagnosis;
pub mod error;
pub mod id;
pub mod value_object;

pub use chat::{ChatMessage, Role};
pub use crop::{CropRecommendation, CropRecommendationInput, Reading};
pub use diagnosis::{Confidence, DiagnosisResult, DiseaseFinding, Severity, TreatmentStep};
pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{FarmId, MessageId, TaskId};
pub use value_object::ValueObject;
