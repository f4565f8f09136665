//! Deterministic placeholder artifacts for when the model path is exhausted.
//!
//! Pure and network-free. The answer/explanation wording is a stable
//! template: downstream consumers that still key on it keep working, even
//! though `Origin::Fallback` is the supported way to detect synthetic
//! content.

use crate::types::{Flashcard, QuizQuestion};

/// Fixed apology returned when the single-shot tutor call fails.
pub const TUTOR_APOLOGY: &str =
    "I'm sorry, I'm having trouble generating a response right now. Please try again later.";

/// The fallback answer marker.
pub fn fallback_answer(topic: &str) -> String {
    format!("Important concept related to {}.", topic)
}

/// One card per key term, at most five.
pub fn flashcards(topic: &str, key_terms: &[String]) -> Vec<Flashcard> {
    key_terms
        .iter()
        .take(5)
        .map(|term| Flashcard {
            question: format!("What is {}?", term),
            answer: fallback_answer(topic),
        })
        .collect()
}

/// Generic four-option questions, at most three regardless of the request.
pub fn quiz(topic: &str, requested: usize) -> Vec<QuizQuestion> {
    (0..requested.min(3))
        .map(|i| QuizQuestion {
            question: format!("Question {} about {}?", i + 1, topic),
            options: ["Option A", "Option B", "Option C", "Option D"]
                .iter()
                .map(|o| o.to_string())
                .collect(),
            correct_answer: "A".to_string(),
            explanation: format!(
                "This is the correct answer because of concepts related to {}.",
                topic
            ),
        })
        .collect()
}

/// Fixed recommendation list returned when habit analysis fails.
pub fn recommendations() -> Vec<String> {
    [
        "Balance your study time across all topics.",
        "Review flashcards more frequently to improve retention.",
        "Focus on improving quiz performance with practice questions.",
    ]
    .iter()
    .map(|r| r.to_string())
    .collect()
}
