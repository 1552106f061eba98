//! Parse oracle output into typed values
//!
//! Oracle output is untrusted text that is usually, but not always, a JSON
//! object. Every parse yields a [`ParseOutcome`] so callers must handle the
//! failure case explicitly.

use crate::types::Evaluation;
use serde_json::{Map, Value};

/// Sentinel the oracle returns when no permitted label fits
pub const NO_RELATIONSHIP: &str = "NO_RELATIONSHIP";

/// Result of parsing one oracle response
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// Response had the expected shape
    Parsed(T),
    /// Response could not be interpreted
    ParseFailed {
        /// The response as received
        raw: String,
        /// What was wrong with it
        reason: String,
    },
}

impl<T> ParseOutcome<T> {
    fn failed(raw: &str, reason: impl Into<String>) -> Self {
        ParseOutcome::ParseFailed {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// Convert into a `Result`, discarding the raw text on failure
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ParseOutcome::Parsed(value) => Ok(value),
            ParseOutcome::ParseFailed { reason, .. } => Err(reason),
        }
    }
}

/// A relationship answer as the oracle phrased it, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipAnswer {
    /// Chosen label, the sentinel, or empty
    pub relationship_type: String,
    /// One-to-two sentence justification
    pub justification: String,
}

impl RelationshipAnswer {
    /// True when the oracle declined to relate the pair
    pub fn is_no_relationship(&self) -> bool {
        let label = self.relationship_type.trim();
        label.is_empty() || label.eq_ignore_ascii_case(NO_RELATIONSHIP)
    }
}

/// Strip markdown code fences the oracle may wrap JSON in
///
/// Handles "```json ... ```", bare "``` ... ```" and single-line fences.
/// Text without a leading fence is only trimmed.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Language tag, if any ("json", "JSON", ...)
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse the response as a single JSON object
///
/// Falls back to the outermost `{ ... }` span when the oracle surrounds the
/// object with prose.
fn parse_object(response: &str) -> Result<Map<String, Value>, String> {
    let cleaned = strip_code_fences(response);

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(first_err) => {
            let span = cleaned
                .find('{')
                .zip(cleaned.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &cleaned[start..=end]);
            match span {
                Some(inner) => serde_json::from_str(inner)
                    .map_err(|_| format!("JSON parse error: {}", first_err))?,
                None => return Err(format!("JSON parse error: {}", first_err)),
            }
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("Expected JSON object, got {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a required key that must be a string (null reads as empty)
fn required_string(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) => Ok(String::new()),
        Some(other) => Err(format!("'{}' must be a string, got {}", key, json_kind(other))),
        None => Err(format!("Missing '{}'", key)),
    }
}

/// Parse a relationship decision `{relationship_type, justification}`
pub fn parse_relationship(response: &str) -> ParseOutcome<RelationshipAnswer> {
    let obj = match parse_object(response) {
        Ok(obj) => obj,
        Err(reason) => return ParseOutcome::failed(response, reason),
    };

    let relationship_type = match required_string(&obj, "relationship_type") {
        Ok(value) => value,
        Err(reason) => return ParseOutcome::failed(response, reason),
    };
    let justification = match required_string(&obj, "justification") {
        Ok(value) => value,
        Err(reason) => return ParseOutcome::failed(response, reason),
    };

    ParseOutcome::Parsed(RelationshipAnswer {
        relationship_type,
        justification,
    })
}

/// Parse an evaluation `{score, justification}`
///
/// Numeric strings are accepted for `score`; the score is clamped to [0, 10].
pub fn parse_evaluation(response: &str) -> ParseOutcome<Evaluation> {
    let obj = match parse_object(response) {
        Ok(obj) => obj,
        Err(reason) => return ParseOutcome::failed(response, reason),
    };

    let score = match obj.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(score) = score.filter(|s| s.is_finite()) else {
        return ParseOutcome::failed(response, "Missing or non-numeric 'score'");
    };

    let justification = match required_string(&obj, "justification") {
        Ok(value) => value,
        Err(reason) => return ParseOutcome::failed(response, reason),
    };

    ParseOutcome::Parsed(Evaluation {
        score: score.clamp(0.0, 10.0),
        justification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_relationship() {
        let outcome =
            parse_relationship(r#"{"relationship_type": "attributed-to", "justification": "x"}"#);
        assert_eq!(
            outcome,
            ParseOutcome::Parsed(RelationshipAnswer {
                relationship_type: "attributed-to".to_string(),
                justification: "x".to_string(),
            })
        );
    }

    #[test]
    fn test_code_fence_parses_identically() {
        let plain = r#"{"relationship_type": "uses", "justification": "because"}"#;
        let fenced = format!("```json\n{}\n```", plain);
        let bare = format!("```\n{}\n```", plain);
        let inline = format!("```json {}```", plain);

        let expected = parse_relationship(plain);
        assert!(matches!(expected, ParseOutcome::Parsed(_)));
        assert_eq!(parse_relationship(&fenced), expected);
        assert_eq!(parse_relationship(&bare), expected);
        assert_eq!(parse_relationship(&inline), expected);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```JSON\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}"), "{}");
    }

    #[test]
    fn test_prose_around_object() {
        let outcome = parse_relationship(
            "Sure! Here you go: {\"relationship_type\": \"uses\", \"justification\": \"y\"} Hope it helps.",
        );
        assert!(matches!(outcome, ParseOutcome::Parsed(ref a) if a.relationship_type == "uses"));
    }

    #[test]
    fn test_malformed_json() {
        let outcome = parse_relationship("This is not JSON");
        match outcome {
            ParseOutcome::ParseFailed { raw, reason } => {
                assert_eq!(raw, "This is not JSON");
                assert!(reason.contains("JSON parse error"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key() {
        let outcome = parse_relationship(r#"{"relationship_type": "uses"}"#);
        assert!(matches!(outcome, ParseOutcome::ParseFailed { ref reason, .. } if reason.contains("justification")));
    }

    #[test]
    fn test_non_object() {
        let outcome = parse_relationship(r#"["uses"]"#);
        assert!(matches!(outcome, ParseOutcome::ParseFailed { ref reason, .. } if reason.contains("array")));
    }

    #[test]
    fn test_wrong_type() {
        let outcome = parse_relationship(r#"{"relationship_type": 3, "justification": "x"}"#);
        assert!(matches!(outcome, ParseOutcome::ParseFailed { .. }));
    }

    #[test]
    fn test_null_label_reads_as_no_relationship() {
        let answer = parse_relationship(r#"{"relationship_type": null, "justification": "n/a"}"#)
            .into_result()
            .unwrap();
        assert!(answer.is_no_relationship());
    }

    #[test]
    fn test_sentinel_is_case_insensitive() {
        for label in ["NO_RELATIONSHIP", "no_relationship", "No_Relationship", "  "] {
            let answer = RelationshipAnswer {
                relationship_type: label.to_string(),
                justification: String::new(),
            };
            assert!(answer.is_no_relationship(), "{}", label);
        }
        let answer = RelationshipAnswer {
            relationship_type: "uses".to_string(),
            justification: String::new(),
        };
        assert!(!answer.is_no_relationship());
    }

    #[test]
    fn test_parse_evaluation() {
        let eval = parse_evaluation(r#"{"score": 7, "justification": "Coherent."}"#)
            .into_result()
            .unwrap();
        assert_eq!(eval.score, 7.0);
        assert_eq!(eval.justification, "Coherent.");
    }

    #[test]
    fn test_parse_evaluation_fenced_and_clamped() {
        let eval = parse_evaluation("```json\n{\"score\": 14.5, \"justification\": \"j\"}\n```")
            .into_result()
            .unwrap();
        assert_eq!(eval.score, 10.0);

        let eval = parse_evaluation(r#"{"score": "-2", "justification": "j"}"#)
            .into_result()
            .unwrap();
        assert_eq!(eval.score, 0.0);
    }

    #[test]
    fn test_parse_evaluation_missing_score() {
        let outcome = parse_evaluation(r#"{"justification": "j"}"#);
        assert!(matches!(outcome, ParseOutcome::ParseFailed { .. }));
        let outcome = parse_evaluation(r#"{"score": "high", "justification": "j"}"#);
        assert!(matches!(outcome, ParseOutcome::ParseFailed { .. }));
    }
}
