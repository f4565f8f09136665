//! Domain types for generated study artifacts.

use serde::{Deserialize, Serialize};

/// What kind of artifact a request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Flashcards,
    Quiz,
    TutorAnswer,
    Recommendations,
}

impl ArtifactKind {
    /// Stable tag used in attempt logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Flashcards => "flashcards",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::TutorAnswer => "tutor_answer",
            ArtifactKind::Recommendations => "recommendations",
        }
    }
}

/// A loosely-specified request for one artifact set.
///
/// For `TutorAnswer` the topic carries the student's question and
/// `source_text` the optional context. For `Recommendations` the
/// `source_text` carries the rendered study statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: ArtifactKind,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    pub requested_count: usize,
}

impl GenerationRequest {
    pub fn flashcards(topic: &str, text: &str, count: usize) -> Self {
        Self {
            kind: ArtifactKind::Flashcards,
            topic: topic.to_string(),
            source_text: Some(text.to_string()),
            difficulty: None,
            requested_count: count,
        }
    }

    pub fn quiz(topic: &str, difficulty: u8, count: usize, context: Option<&str>) -> Self {
        Self {
            kind: ArtifactKind::Quiz,
            topic: topic.to_string(),
            source_text: context.map(|c| c.to_string()),
            difficulty: Some(difficulty),
            requested_count: count,
        }
    }

    pub fn tutor(question: &str, context: Option<&str>) -> Self {
        Self {
            kind: ArtifactKind::TutorAnswer,
            topic: question.to_string(),
            source_text: context.map(|c| c.to_string()),
            difficulty: None,
            requested_count: 1,
        }
    }

    pub fn recommendations(study_stats: &str) -> Self {
        Self {
            kind: ArtifactKind::Recommendations,
            topic: String::new(),
            source_text: Some(study_stats.to_string()),
            difficulty: None,
            requested_count: 3,
        }
    }
}

/// One question/answer study card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// One multiple-choice quiz question. `options` always holds exactly four
/// entries with any option-letter prefixes stripped; `correct_answer` is one
/// of `A`..`D`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

/// Where a result came from: a validated model completion, or synthetic
/// fallback after chain exhaustion. A first-class tag so callers never have
/// to infer fallback content by scanning answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Model,
    Fallback,
}

/// Outcome of one run of the generation chain.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult<T> {
    pub items: Vec<T>,
    pub origin: Origin,
    /// Model that produced the items. Always set when `origin` is `Model`.
    pub model_used: Option<String>,
    /// Total attempts across the whole chain, the successful one included.
    pub attempts_made: u32,
}

impl<T> GenerationResult<T> {
    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Origin::Model).unwrap(), "\"model\"");
        assert_eq!(
            serde_json::to_string(&Origin::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    #[test]
    fn request_constructors_set_kind() {
        let req = GenerationRequest::flashcards("Biology", "cells...", 5);
        assert_eq!(req.kind, ArtifactKind::Flashcards);
        assert_eq!(req.requested_count, 5);

        let req = GenerationRequest::quiz("History", 4, 10, None);
        assert_eq!(req.kind, ArtifactKind::Quiz);
        assert_eq!(req.difficulty, Some(4));
        assert!(req.source_text.is_none());
    }
}
