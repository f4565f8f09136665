//! Structural validation of parsed artifact payloads.
//!
//! Enforces the contract of each artifact type on untyped JSON before it is
//! treated as domain data. A count different from the requested number is a
//! warning, not a failure: partial results are accepted. Missing or mistyped
//! fields always fail, identifying the offending item and field.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::AttemptError;
use crate::types::{Flashcard, QuizQuestion};

/// Letters accepted as a quiz answer key.
const ANSWER_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// Validate a flashcard payload: an array of objects with non-empty string
/// `question` and `answer` fields.
pub fn validate_flashcards(
    payload: &Value,
    requested: usize,
) -> Result<Vec<Flashcard>, AttemptError> {
    let items = payload
        .as_array()
        .ok_or_else(|| schema_error(0, "payload is not an array"))?;

    if items.len() != requested {
        warn!(
            expected = requested,
            got = items.len(),
            "flashcard count differs from requested"
        );
    }

    let mut cards = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| schema_error(index, "item is not an object"))?;
        cards.push(Flashcard {
            question: required_string(object, "question", index)?,
            answer: required_string(object, "answer", index)?,
        });
    }
    Ok(cards)
}

/// Validate a quiz payload: an array of objects with `question`, exactly
/// four `options` (option-letter prefixes stripped before the count check),
/// a `correct_answer` in A..D and an `explanation`.
pub fn validate_quiz(payload: &Value, requested: usize) -> Result<Vec<QuizQuestion>, AttemptError> {
    let items = payload
        .as_array()
        .ok_or_else(|| schema_error(0, "payload is not an array"))?;

    if items.len() != requested {
        warn!(
            expected = requested,
            got = items.len(),
            "quiz question count differs from requested"
        );
    }

    let prefix = regex::Regex::new(r"^[A-Da-d][.)]\s*").unwrap();

    let mut questions = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| schema_error(index, "item is not an object"))?;

        let question = required_string(object, "question", index)?;
        let explanation = string_field(object, "explanation", index)?;

        let correct_answer = string_field(object, "correct_answer", index)?;
        if !ANSWER_LETTERS.contains(&correct_answer.as_str()) {
            return Err(schema_error(
                index,
                &format!("correct_answer '{}' is not one of A-D", correct_answer),
            ));
        }

        let raw_options = object
            .get("options")
            .ok_or_else(|| schema_error(index, "missing field 'options'"))?
            .as_array()
            .ok_or_else(|| schema_error(index, "field 'options' is not an array"))?;

        let mut options = Vec::with_capacity(raw_options.len());
        for option in raw_options {
            let text = option
                .as_str()
                .ok_or_else(|| schema_error(index, "option is not a string"))?;
            options.push(prefix.replace(text.trim(), "").into_owned());
        }
        if options.len() != 4 {
            return Err(schema_error(
                index,
                &format!("expected 4 options, got {}", options.len()),
            ));
        }

        questions.push(QuizQuestion {
            question,
            options,
            correct_answer,
            explanation,
        });
    }
    Ok(questions)
}

fn schema_error(index: usize, reason: &str) -> AttemptError {
    AttemptError::Schema {
        index,
        reason: reason.to_string(),
    }
}

/// A string field that must be present and non-empty.
fn required_string(
    object: &Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<String, AttemptError> {
    let text = string_field(object, field, index)?;
    if text.trim().is_empty() {
        return Err(schema_error(index, &format!("field '{}' is empty", field)));
    }
    Ok(text)
}

/// A string field that must be present; emptiness is allowed.
fn string_field(
    object: &Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<String, AttemptError> {
    object
        .get(field)
        .ok_or_else(|| schema_error(index, &format!("missing field '{}'", field)))?
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| schema_error(index, &format!("field '{}' is not a string", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiz_item() -> Value {
        json!({
            "question": "Capital of France?",
            "options": ["A) Paris", "B) Lyon", "C) Nice", "D) Lille"],
            "correct_answer": "A",
            "explanation": "Paris is the capital."
        })
    }

    #[test]
    fn flashcards_validate() {
        let payload = json!([
            {"question": "Q1", "answer": "A1"},
            {"question": "Q2", "answer": "A2"}
        ]);
        let cards = validate_flashcards(&payload, 2).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].question, "Q1");
    }

    #[test]
    fn flashcard_count_mismatch_is_accepted() {
        let payload = json!([{"question": "Q", "answer": "A"}]);
        assert_eq!(validate_flashcards(&payload, 5).unwrap().len(), 1);
    }

    #[test]
    fn flashcard_missing_answer_fails() {
        let payload = json!([{"question": "Q"}]);
        let err = validate_flashcards(&payload, 1).unwrap_err();
        match err {
            AttemptError::Schema { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.contains("answer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn flashcard_mistyped_question_fails() {
        let payload = json!([{"question": 42, "answer": "A"}]);
        assert!(validate_flashcards(&payload, 1).is_err());
    }

    #[test]
    fn flashcard_non_array_payload_fails() {
        let payload = json!({"flashcards": []});
        assert!(validate_flashcards(&payload, 5).is_err());
    }

    #[test]
    fn quiz_item_validates_with_answer_b() {
        let mut item = quiz_item();
        item["correct_answer"] = json!("B");
        let questions = validate_quiz(&json!([item]), 1).unwrap();
        assert_eq!(questions[0].correct_answer, "B");
        assert_eq!(questions[0].options, vec!["Paris", "Lyon", "Nice", "Lille"]);
    }

    #[test]
    fn quiz_three_options_fails() {
        let mut item = quiz_item();
        item["options"] = json!(["A) Paris", "B) Lyon", "C) Nice"]);
        let err = validate_quiz(&json!([item]), 1).unwrap_err();
        match err {
            AttemptError::Schema { reason, .. } => assert!(reason.contains("3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn quiz_answer_e_fails() {
        let mut item = quiz_item();
        item["correct_answer"] = json!("E");
        assert!(validate_quiz(&json!([item]), 1).is_err());
    }

    #[test]
    fn quiz_missing_explanation_fails() {
        let mut item = quiz_item();
        item.as_object_mut().unwrap().remove("explanation");
        assert!(validate_quiz(&json!([item]), 1).is_err());
    }

    #[test]
    fn option_prefixes_normalize() {
        let mut item = quiz_item();
        item["options"] = json!(["A) Paris", "a. Paris", "C)Paris", "Paris"]);
        let questions = validate_quiz(&json!([item]), 1).unwrap();
        assert_eq!(questions[0].options, vec!["Paris"; 4]);
    }

    #[test]
    fn empty_explanation_is_allowed() {
        let mut item = quiz_item();
        item["explanation"] = json!("");
        assert!(validate_quiz(&json!([item]), 1).is_ok());
    }
}
