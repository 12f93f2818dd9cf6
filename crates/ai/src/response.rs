//! Parsing of raw model text into typed results.

use serde::de::DeserializeOwned;

use crate::result::InferenceError;

/// Remove a surrounding Markdown code fence, if any.
///
/// Handles a leading "```" with or without a language tag ("```json") and a
/// trailing "```". Text without a fence is returned trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json", "JSON", ...) up to the end of the opening line.
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}

/// Strip fences and deserialize; every failure becomes `Malformed`.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, InferenceError> {
    let body = strip_code_fences(raw);
    if body.is_empty() {
        return Err(InferenceError::malformed("empty response"));
    }
    serde_json::from_str(body).map_err(|e| InferenceError::malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrointel_core::{CropRecommendation, DiagnosisResult};
    use proptest::prelude::*;

    const DIAGNOSIS: &str = r#"{"disease_found":true,"disease_name":"Leaf Spot","confidence":85,"severity":"Moderate","symptoms":"spots","treatment_steps":[{"day":1,"action":"Remove infected leaves"}],"prevention":"airflow"}"#;

    #[test]
    fn strips_json_fence() {
        let raw = format!("```json\n{DIAGNOSIS}\n```");
        assert_eq!(strip_code_fences(&raw), DIAGNOSIS);
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        let raw = format!("  ```\n{DIAGNOSIS}\n```  \n");
        assert_eq!(strip_code_fences(&raw), DIAGNOSIS);
    }

    #[test]
    fn strips_single_line_fence() {
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("\n {\"a\":1} \n"), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_diagnosis() {
        let raw = format!("```json\n{DIAGNOSIS}\n```");
        let parsed: DiagnosisResult = parse_json(&raw).unwrap();
        assert_eq!(parsed.finding().unwrap().name, "Leaf Spot");
    }

    #[test]
    fn prose_is_malformed() {
        let err = parse_json::<CropRecommendation>("Sure! Rice would be great.").unwrap_err();
        assert!(matches!(err, InferenceError::Malformed(_)));
    }

    #[test]
    fn invalid_fields_are_malformed() {
        let raw = DIAGNOSIS.replace("85", "\"high\"");
        let err = parse_json::<DiagnosisResult>(&raw).unwrap_err();
        assert!(matches!(err, InferenceError::Malformed(_)));
    }

    #[test]
    fn empty_fence_is_malformed() {
        let err = parse_json::<DiagnosisResult>("```json\n```").unwrap_err();
        assert!(matches!(err, InferenceError::Malformed(_)));
    }

    proptest! {
        #[test]
        fn fencing_never_changes_the_parsed_value(tag in "(json|JSON)?", pad in "[ \n]{0,3}") {
            let raw = format!("{pad}```{tag}\n{DIAGNOSIS}\n```{pad}");
            let fenced: DiagnosisResult = parse_json(&raw).unwrap();
            let plain: DiagnosisResult = parse_json(DIAGNOSIS).unwrap();
            prop_assert_eq!(fenced, plain);
        }
    }
}
