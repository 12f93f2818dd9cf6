//! Crop-recommendation request and response values.

use serde::{Deserialize, Serialize};

use crate::diagnosis::Confidence;
use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A numeric measurement that remembers how it was typed.
///
/// The request sent to the inference service quotes `text`, so "6.50" reaches
/// the model as "6.50" and not as a reformatted float.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    value: f64,
    text: String,
}

impl Reading {
    /// Parse a form entry. Empty entries are reported as missing, not invalid.
    pub fn parse(field: &'static str, raw: &str) -> DomainResult<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DomainError::MissingField(field));
        }
        let value: f64 = text
            .parse()
            .map_err(|_| DomainError::validation(format!("{field} must be a number (got {text:?})")))?;
        if !value.is_finite() {
            return Err(DomainError::validation(format!("{field} must be a finite number")));
        }
        Ok(Self {
            value,
            text: text.to_string(),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl core::fmt::Display for Reading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

impl ValueObject for Reading {}

/// Soil and climate measurements for one recommendation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRecommendationInput {
    nitrogen: Reading,
    phosphorus: Reading,
    potassium: Reading,
    ph: Reading,
    rainfall_mm: Reading,
    location: String,
}

impl CropRecommendationInput {
    pub fn new(
        nitrogen: Reading,
        phosphorus: Reading,
        potassium: Reading,
        ph: Reading,
        rainfall_mm: Reading,
        location: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::check_nutrient("nitrogen", &nitrogen)?;
        Self::check_nutrient("phosphorus", &phosphorus)?;
        Self::check_nutrient("potassium", &potassium)?;
        Self::check_ph(&ph)?;
        Self::check_rainfall(&rainfall_mm)?;
        let location = Self::check_location(&location.into())?;

        Ok(Self {
            nitrogen,
            phosphorus,
            potassium,
            ph,
            rainfall_mm,
            location,
        })
    }

    /// Soil nutrient levels cannot be negative.
    pub fn check_nutrient(field: &'static str, reading: &Reading) -> DomainResult<()> {
        if reading.value() < 0.0 {
            return Err(DomainError::validation(format!("{field} cannot be negative")));
        }
        Ok(())
    }

    pub fn check_ph(ph: &Reading) -> DomainResult<()> {
        if !(0.0..=14.0).contains(&ph.value()) {
            return Err(DomainError::validation(format!("pH must be within 0–14 (got {ph})")));
        }
        Ok(())
    }

    pub fn check_rainfall(rainfall_mm: &Reading) -> DomainResult<()> {
        if rainfall_mm.value() < 0.0 {
            return Err(DomainError::validation("rainfall cannot be negative"));
        }
        Ok(())
    }

    /// Returns the trimmed location.
    pub fn check_location(location: &str) -> DomainResult<String> {
        let location = location.trim();
        if location.is_empty() {
            return Err(DomainError::MissingField("location"));
        }
        Ok(location.to_string())
    }

    pub fn nitrogen(&self) -> &Reading {
        &self.nitrogen
    }

    pub fn phosphorus(&self) -> &Reading {
        &self.phosphorus
    }

    pub fn potassium(&self) -> &Reading {
        &self.potassium
    }

    pub fn ph(&self) -> &Reading {
        &self.ph
    }

    pub fn rainfall_mm(&self) -> &Reading {
        &self.rainfall_mm
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl ValueObject for CropRecommendationInput {}

/// Recommended crop returned by the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CropRecommendationWire")]
pub struct CropRecommendation {
    pub recommended_crop: String,
    pub confidence: Confidence,
    pub reasoning: String,
    pub tips: Vec<String>,
}

impl ValueObject for CropRecommendation {}

/// Accepts the field names used by both generations of the recommendation prompt.
#[derive(Debug, Deserialize)]
struct CropRecommendationWire {
    #[serde(alias = "crop")]
    recommended_crop: String,
    confidence: Confidence,
    #[serde(alias = "reason")]
    reasoning: String,
    #[serde(default, alias = "farming_tips")]
    tips: Vec<String>,
}

impl TryFrom<CropRecommendationWire> for CropRecommendation {
    type Error = DomainError;

    fn try_from(wire: CropRecommendationWire) -> Result<Self, Self::Error> {
        if wire.recommended_crop.trim().is_empty() {
            return Err(DomainError::MissingField("recommended_crop"));
        }
        Ok(Self {
            recommended_crop: wire.recommended_crop,
            confidence: wire.confidence,
            reasoning: wire.reasoning,
            tips: wire.tips,
        })
    }
}
