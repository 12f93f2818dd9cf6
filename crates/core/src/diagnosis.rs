//! Disease-detection output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Model confidence, an integer percentage in `0..=100`.
///
/// Deserializes only from JSON integers; `"high"` or `85.5` are rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> DomainResult<Self> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::validation(format!(
                "confidence must be within 0..=100 (got {value})"
            )))
        }
    }

    /// Clamp to the valid range instead of failing.
    pub fn clamped(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Confidence {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

impl core::fmt::Display for Confidence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl ValueObject for Confidence {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Critical,
}

impl ValueObject for Severity {}

/// One treatment action, scheduled relative to the day of diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentStep {
    /// Day of the plan, starting at 1.
    pub day: u32,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<String>,
}

impl ValueObject for TreatmentStep {}

/// What was found when `disease_found` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseFinding {
    pub name: String,
    /// Order-significant: the plan is followed front to back.
    pub treatment_steps: Vec<TreatmentStep>,
}

/// Structured diagnosis returned by the disease-detection request.
///
/// The disease name and treatment plan only exist inside [`DiseaseFinding`],
/// so a healthy diagnosis has nothing to dereference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DiagnosisWire", into = "DiagnosisWire")]
pub struct DiagnosisResult {
    finding: Option<DiseaseFinding>,
    confidence: Confidence,
    severity: Severity,
    symptoms: String,
    prevention: String,
}

impl DiagnosisResult {
    pub fn new(
        finding: Option<DiseaseFinding>,
        confidence: Confidence,
        severity: Severity,
        symptoms: impl Into<String>,
        prevention: impl Into<String>,
    ) -> DomainResult<Self> {
        if let Some(finding) = &finding {
            if finding.name.trim().is_empty() {
                return Err(DomainError::validation("disease_name is empty although a disease was found"));
            }
            if let Some(step) = finding.treatment_steps.iter().find(|s| s.day == 0) {
                return Err(DomainError::validation(format!(
                    "treatment step day must be >= 1 (action: {})",
                    step.action
                )));
            }
        }

        Ok(Self {
            finding,
            confidence,
            severity,
            symptoms: symptoms.into(),
            prevention: prevention.into(),
        })
    }

    pub fn disease_found(&self) -> bool {
        self.finding.is_some()
    }

    pub fn finding(&self) -> Option<&DiseaseFinding> {
        self.finding.as_ref()
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn symptoms(&self) -> &str {
        &self.symptoms
    }

    pub fn prevention(&self) -> &str {
        &self.prevention
    }
}

impl ValueObject for DiagnosisResult {}

/// JSON shape exchanged with the inference service.
///
/// Older prompts produced `"treatment": {"step_1": {..}, "step_2": {..}}`; that
/// form is still accepted on input and normalized into `treatment_steps`.
#[derive(Debug, Serialize, Deserialize)]
struct DiagnosisWire {
    disease_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disease_name: Option<String>,
    confidence: Confidence,
    severity: Severity,
    symptoms: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    treatment_steps: Vec<TreatmentStep>,
    #[serde(default, skip_serializing)]
    treatment: Option<BTreeMap<String, TreatmentStep>>,
    prevention: String,
}

impl TryFrom<DiagnosisWire> for DiagnosisResult {
    type Error = DomainError;

    fn try_from(wire: DiagnosisWire) -> Result<Self, Self::Error> {
        let finding = if wire.disease_found {
            let name = wire
                .disease_name
                .ok_or(DomainError::MissingField("disease_name"))?;
            let treatment_steps = match wire.treatment {
                Some(legacy) if wire.treatment_steps.is_empty() => ordered_legacy_steps(legacy)?,
                _ => wire.treatment_steps,
            };
            Some(DiseaseFinding { name, treatment_steps })
        } else {
            None
        };

        DiagnosisResult::new(
            finding,
            wire.confidence,
            wire.severity,
            wire.symptoms,
            wire.prevention,
        )
    }
}

impl From<DiagnosisResult> for DiagnosisWire {
    fn from(value: DiagnosisResult) -> Self {
        let (disease_name, treatment_steps) = match value.finding {
            Some(f) => (Some(f.name), f.treatment_steps),
            None => (None, Vec::new()),
        };
        Self {
            disease_found: disease_name.is_some(),
            disease_name,
            confidence: value.confidence,
            severity: value.severity,
            symptoms: value.symptoms,
            treatment_steps,
            treatment: None,
            prevention: value.prevention,
        }
    }
}

/// Order `step_N` entries by `N` (a map sorts `step_10` before `step_2`).
fn ordered_legacy_steps(legacy: BTreeMap<String, TreatmentStep>) -> DomainResult<Vec<TreatmentStep>> {
    let mut numbered = Vec::with_capacity(legacy.len());
    for (key, step) in legacy {
        let index: u32 = key
            .strip_prefix("step_")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| DomainError::validation(format!("unexpected treatment key: {key}")))?;
        numbered.push((index, step));
    }
    numbered.sort_by_key(|(index, _)| *index);
    Ok(numbered.into_iter().map(|(_, step)| step).collect())
}
