//! Best-effort extraction of a grading result from raw model output.
//!
//! Grading models reliably produce JSON-shaped text but not always strictly
//! valid JSON (trailing commentary, minor syntax errors). The lenient chain
//! here always returns some answer instead of propagating a parse failure.

use crate::error::{GraderError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// A structured grade parsed out of a model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Integer score, 0-100 for a valid grade.
    pub score: i64,
    /// Justification from the grader.
    pub explanation: String,
}

/// First standalone run of 1-3 digits, bounded by word boundaries.
static SCORE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,3})\b").expect("valid regex"));

/// Extract a grading result from an arbitrary reply string.
///
/// Fallback chain, each stage running only if the prior failed:
/// 1. The span from the first `{` to the last `}` is parsed as a JSON
///    object; `score` defaults to 0, `explanation` to the candidate text.
/// 2. The first standalone 1-3 digit number becomes the score, with the
///    whole input as explanation.
/// 3. Score 0 with the whole input as explanation.
///
/// Scores are not clamped at this layer.
pub fn extract_grading(input: &str) -> GradingResult {
    if let (Some(start), Some(end)) = (input.find('{'), input.rfind('}')) {
        if end > start {
            let candidate = &input[start..=end];
            if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(candidate) {
                let score = object.get("score").and_then(coerce_score).unwrap_or(0);
                let explanation = object
                    .get("explanation")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| candidate.to_string());
                return GradingResult { score, explanation };
            }
        }
    }

    if let Some(capture) = SCORE_DIGITS.captures(input) {
        if let Ok(score) = capture[1].parse() {
            return GradingResult {
                score,
                explanation: input.to_string(),
            };
        }
    }

    GradingResult {
        score: 0,
        explanation: input.to_string(),
    }
}

/// Strict parse variant used by the tabular pipeline.
///
/// Takes everything from the first `{` or `[` to the end of the input and
/// parses it as-is; any trailing commentary or malformed syntax is a real
/// error here, not recovered. Successful scores are clamped to 0-100.
pub fn parse_strict(input: &str) -> Result<GradingResult> {
    let start = input
        .find(['{', '['])
        .ok_or_else(|| GraderError::ResponseParse("no JSON payload in reply".to_string()))?;

    let value: Value = serde_json::from_str(&input[start..])
        .map_err(|e| GraderError::ResponseParse(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| GraderError::ResponseParse("reply payload is not an object".to_string()))?;

    let score = match object.get("score") {
        Some(v) => coerce_score(v)
            .ok_or_else(|| GraderError::ResponseParse(format!("non-integer score: {}", v)))?,
        None => 0,
    };

    let explanation = object
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| input.to_string());

    Ok(GradingResult {
        score: score.clamp(0, 100),
        explanation,
    })
}

/// Coerce a JSON value into an integer score.
fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_object() {
        let result = extract_grading(r#"{"score": 85, "explanation": "Mostly correct"}"#);
        assert_eq!(result.score, 85);
        assert_eq!(result.explanation, "Mostly correct");
    }

    #[test]
    fn test_json_with_surrounding_noise() {
        let input = "Sure, here is my evaluation:\n{\"score\": 42, \"explanation\": \"Partial\"}\nHope that helps!";
        let result = extract_grading(input);
        assert_eq!(result.score, 42);
        assert_eq!(result.explanation, "Partial");
    }

    #[test]
    fn test_missing_fields_default() {
        let result = extract_grading(r#"{"verdict": "fine"}"#);
        assert_eq!(result.score, 0);
        assert_eq!(result.explanation, r#"{"verdict": "fine"}"#);
    }

    #[test]
    fn test_score_as_string_is_coerced() {
        let result = extract_grading(r#"{"score": "90", "explanation": "Good"}"#);
        assert_eq!(result.score, 90);
    }

    #[test]
    fn test_malformed_json_falls_back_to_digit_scan() {
        let input = "{\"score\": 70, \"explanation\": }";
        let result = extract_grading(input);
        assert_eq!(result.score, 70);
        assert_eq!(result.explanation, input);
    }

    #[test]
    fn test_bare_number_reply() {
        let input = "I would give this answer 73 points.";
        let result = extract_grading(input);
        assert_eq!(result.score, 73);
        assert_eq!(result.explanation, input);
    }

    #[test]
    fn test_four_digit_number_is_not_a_score() {
        let input = "The year 1995 is mentioned nowhere.";
        let result = extract_grading(input);
        assert_eq!(result.score, 0);
        assert_eq!(result.explanation, input);
    }

    #[test]
    fn test_no_json_no_number() {
        let input = "The answer is completely unrelated.";
        let result = extract_grading(input);
        assert_eq!(result.score, 0);
        assert_eq!(result.explanation, input);
    }

    #[test]
    fn test_idempotent_on_own_explanation() {
        let input = "garbled reply with no braces and no score";
        let first = extract_grading(input);
        assert_eq!(first.explanation, input);

        let second = extract_grading(&first.explanation);
        assert_eq!(second, first);
    }

    #[test]
    fn test_no_clamping_in_lenient_chain() {
        let result = extract_grading(r#"{"score": 250, "explanation": "generous"}"#);
        assert_eq!(result.score, 250);
    }

    #[test]
    fn test_strict_parse_valid() {
        let result = parse_strict(r#"{"score": 88, "explanation": "ok"}"#).unwrap();
        assert_eq!(result.score, 88);
        assert_eq!(result.explanation, "ok");
    }

    #[test]
    fn test_strict_parse_leading_noise() {
        let result = parse_strict("Here you go: {\"score\": 12, \"explanation\": \"bad\"}").unwrap();
        assert_eq!(result.score, 12);
    }

    #[test]
    fn test_strict_parse_rejects_trailing_commentary() {
        let input = "{\"score\": 50, \"explanation\": \"meh\"} -- as requested";
        assert!(parse_strict(input).is_err());
    }

    #[test]
    fn test_strict_parse_rejects_array_payload() {
        assert!(parse_strict(r#"[1, 2, 3]"#).is_err());
    }

    #[test]
    fn test_strict_parse_clamps() {
        let result = parse_strict(r#"{"score": 250, "explanation": "over"}"#).unwrap();
        assert_eq!(result.score, 100);

        let result = parse_strict(r#"{"score": -3, "explanation": "under"}"#).unwrap();
        assert_eq!(result.score, 0);
    }
}
