//! Fixed instructions sent to the inference service.

use agrointel_core::CropRecommendationInput;

/// First assistant message of every chat session.
pub const CHAT_GREETING: &str = "Hello! I am your AgroIntel expert assistant. Ask me anything about your crops, soil, or farming techniques.";

/// Reply appended to the transcript when a chat turn fails.
pub const CHAT_APOLOGY: &str = "I'm sorry, I'm having trouble connecting to the network. Please try again later.";

/// System instruction for chat turns.
pub const CHAT_INSTRUCTION: &str = "You are AgroIntel, a friendly farming assistant for smallholder farmers in Kerala, India. \
Answer questions about crops, soil, pests and farming techniques in short, practical sentences.";

/// Instruction accompanying the crop photo.
pub const DETECTION_PROMPT: &str = r#"You are an expert agricultural pathologist in India (specifically Kerala). Analyze this crop image.
Return only a JSON object with exactly these fields:
{
  "disease_found": boolean,
  "disease_name": "string",
  "confidence": integer between 0 and 100,
  "severity": "Mild" | "Moderate" | "Critical",
  "symptoms": "string",
  "treatment_steps": [
    { "day": integer starting at 1, "action": "string", "cost_estimate": "₹..." }
  ],
  "prevention": "string"
}
List treatment steps in the order they should be carried out."#;

/// Prompt for a crop recommendation. Every reading is quoted exactly as entered.
pub fn crop_recommendation(input: &CropRecommendationInput) -> String {
    format!(
        r#"You are an expert agronomist. Based on the following soil and environmental data, recommend the best crop to grow.
Data:
- Nitrogen: {nitrogen}
- Phosphorus: {phosphorus}
- Potassium: {potassium}
- pH Level: {ph}
- Rainfall: {rainfall} mm
- Location: {location}

Return only a JSON object:
{{
  "recommended_crop": "string",
  "confidence": integer between 0 and 100,
  "reasoning": "string",
  "tips": ["string", "string", "string"]
}}"#,
        nitrogen = input.nitrogen(),
        phosphorus = input.phosphorus(),
        potassium = input.potassium(),
        ph = input.ph(),
        rainfall = input.rainfall_mm(),
        location = input.location(),
    )
}
