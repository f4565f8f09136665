//! Heuristic recovery of a JSON payload from free-form completion text.
//!
//! The upstream service is told to return bare JSON but routinely wraps it
//! in code fences or leading prose anyway. Each step here defends against
//! one failure mode; none is assumed sufficient on its own. The bracketed
//! structure is located with a depth-aware scan that understands string
//! literals and escapes, so nested objects inside array elements never
//! truncate the match.

use serde_json::Value;
use std::fmt;

use crate::error::AttemptError;

/// Structural shape the caller expects at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Array,
    Object,
}

impl PayloadShape {
    fn opener(self) -> char {
        match self {
            PayloadShape::Array => '[',
            PayloadShape::Object => '{',
        }
    }

    fn closer(self) -> char {
        match self {
            PayloadShape::Array => ']',
            PayloadShape::Object => '}',
        }
    }
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayloadShape::Array => "JSON array",
            PayloadShape::Object => "JSON object",
        })
    }
}

/// Extract the first complete JSON structure of the expected shape.
///
/// Steps, in order: trim, strip fence markers (with or without a language
/// tag, case-insensitively), discard characters before the first `[` or `{`,
/// locate the structure with a depth-aware scan, deserialize. Failure at any
/// step retains the cleaned text for diagnostics.
pub fn extract_json(raw: &str, expected: PayloadShape) -> Result<Value, AttemptError> {
    let cleaned = strip_fences(raw.trim());
    let body = discard_prefix(cleaned);

    let candidate = match locate_structure(body, expected) {
        Some(span) => span,
        None => return Err(sanitization_failure(expected, cleaned)),
    };

    serde_json::from_str(candidate).map_err(|_| sanitization_failure(expected, cleaned))
}

fn sanitization_failure(expected: PayloadShape, cleaned: &str) -> AttemptError {
    AttemptError::Sanitization {
        expected,
        cleaned: cleaned.to_string(),
    }
}

/// Remove leading/trailing fenced code block markers. The language tag after
/// the opening fence (`json`, `JSON`, anything alphanumeric) is dropped too.
fn strip_fences(text: &str) -> &str {
    let mut out = text;

    if let Some(rest) = out.strip_prefix("```") {
        let tag_len: usize = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .map(|c| c.len_utf8())
            .sum();
        out = rest[tag_len..].trim_start();
    }

    if let Some(rest) = out.strip_suffix("```") {
        out = rest.trim_end();
    }

    out
}

/// Discard any characters before the first `[` or `{`.
fn discard_prefix(text: &str) -> &str {
    match text.find(['[', '{']) {
        Some(start) => &text[start..],
        None => "",
    }
}

/// Locate the first complete bracketed structure of the expected shape.
/// Depth counting skips over string literals, honoring backslash escapes.
fn locate_structure(text: &str, expected: PayloadShape) -> Option<&str> {
    let start = text.find(expected.opener())?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if c == expected.closer() {
                        return Some(&text[start..start + offset + c.len_utf8()]);
                    }
                    // top-level closer of the wrong kind: not a valid structure
                    return None;
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_fenced_json_array() {
        let raw = "```json\n[{\"question\":\"Q\",\"answer\":\"A\"}]\n```";
        let value = extract_json(raw, PayloadShape::Array).unwrap();
        assert_eq!(value, json!([{"question": "Q", "answer": "A"}]));
    }

    #[test]
    fn fence_tag_is_case_insensitive() {
        let raw = "```JSON\n[1, 2, 3]\n```";
        assert_eq!(extract_json(raw, PayloadShape::Array).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn fence_without_language_tag() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(
            extract_json(raw, PayloadShape::Object).unwrap(),
            json!({"a": 1})
        );
    }

    #[test]
    fn discards_leading_prose() {
        let raw = "Sure! Here are your flashcards:\n[{\"question\":\"Q\",\"answer\":\"A\"}]";
        let value = extract_json(raw, PayloadShape::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn ignores_trailing_commentary() {
        let raw = "[1, 2] and that is all you need";
        assert_eq!(extract_json(raw, PayloadShape::Array).unwrap(), json!([1, 2]));
    }

    #[test]
    fn nested_objects_do_not_truncate_the_match() {
        let raw = r#"[{"q":"What is {x}?","meta":{"tags":["a]b","c"]}},{"q":"Q2","meta":{}}]"#;
        let value = extract_json(raw, PayloadShape::Array).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn brackets_inside_strings_are_skipped() {
        let raw = r#"{"note": "arrays look like [1, 2] and escapes like \" too"}"#;
        let value = extract_json(raw, PayloadShape::Object).unwrap();
        assert!(value["note"].as_str().unwrap().contains("[1, 2]"));
    }

    #[test]
    fn object_expected_skips_earlier_array() {
        let raw = "noise [not it] {\"recommendations\": [\"study more\"]}";
        let value = extract_json(raw, PayloadShape::Object).unwrap();
        assert_eq!(value["recommendations"][0], "study more");
    }

    #[test]
    fn idempotent_on_clean_json() {
        let clean = r#"[{"question":"Q","answer":"A"}]"#;
        let once = extract_json(clean, PayloadShape::Array).unwrap();
        let twice = extract_json(&once.to_string(), PayloadShape::Array).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn failure_retains_cleaned_text() {
        let raw = "```json\nthe model refused to answer\n```";
        let err = extract_json(raw, PayloadShape::Array).unwrap_err();
        match err {
            AttemptError::Sanitization { expected, cleaned } => {
                assert_eq!(expected, PayloadShape::Array);
                assert_eq!(cleaned, "the model refused to answer");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn incomplete_structure_fails() {
        let raw = r#"[{"question": "Q", "answer": "A"}"#;
        assert!(extract_json(raw, PayloadShape::Array).is_err());
    }

    #[test]
    fn wrong_shape_fails() {
        let raw = r#"{"flashcards": "not an array at top level"}"#;
        assert!(extract_json(raw, PayloadShape::Array).is_err());
    }
}
