//! Prompt assembly for each artifact kind.
//!
//! Pure functions mapping a request plus key terms to a system/user message
//! pair. The templates demand bare JSON and explicitly forbid markdown
//! fencing; the sanitizer still defends against both, since upstream
//! compliance is not guaranteed.

use crate::types::{ArtifactKind, GenerationRequest};

/// Character budget applied to source text before prompt inclusion.
pub const SOURCE_TEXT_BUDGET: usize = 3000;

/// Quiz difficulty used when a request leaves it unspecified.
const DEFAULT_DIFFICULTY: u8 = 3;

pub const FLASHCARD_SYSTEM_PROMPT: &str =
    "You are an expert creating concise educational flashcards.";

pub const QUIZ_SYSTEM_PROMPT: &str =
    "You are an educational content creator specializing in quiz generation.";

pub const TUTOR_SYSTEM_PROMPT: &str = "You are a helpful and educational AI tutor. Provide \
     clear, accurate information and explanations to help students learn.";

pub const RECOMMENDATIONS_SYSTEM_PROMPT: &str =
    "You are an educational analytics expert who provides personalized study recommendations.";

/// One system/user message pair ready for the completion service.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Build the message pair for a request.
pub fn build(request: &GenerationRequest, key_terms: &[String]) -> Prompt {
    match request.kind {
        ArtifactKind::Flashcards => flashcards(request, key_terms),
        ArtifactKind::Quiz => quiz(request),
        ArtifactKind::TutorAnswer => tutor(request),
        ArtifactKind::Recommendations => recommendations(request),
    }
}

fn flashcards(request: &GenerationRequest, key_terms: &[String]) -> Prompt {
    let text = truncate(request.source_text.as_deref().unwrap_or(""), SOURCE_TEXT_BUDGET);
    let focus: Vec<&str> = key_terms.iter().take(5).map(String::as_str).collect();

    let user = format!(
        "Create {count} flashcards about {topic} based on: {text}\n\
         Focus on: {focus}.\n\
         Return ONLY a JSON array of {count} objects with 'question' and 'answer' strings.\n\
         Do NOT include markdown formatting or code blocks like ```json.\n\
         Example:\n\
         [\n\
           {{\"question\": \"What is X?\", \"answer\": \"X is...\"}},\n\
           {{\"question\": \"Define Y\", \"answer\": \"Y is...\"}}\n\
         ]",
        count = request.requested_count,
        topic = request.topic,
        text = text,
        focus = focus.join(", "),
    );

    Prompt {
        system: FLASHCARD_SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn quiz(request: &GenerationRequest) -> Prompt {
    let context = match request.source_text.as_deref() {
        Some(text) if !text.trim().is_empty() => truncate(text, SOURCE_TEXT_BUDGET).to_string(),
        _ => "Use your general knowledge if no content is provided.".to_string(),
    };

    let user = format!(
        "Create a multiple-choice quiz about \"{topic}\" using the following content:\n\
         {context}\n\
         with {count} questions at difficulty level {difficulty}/5.\n\
         \n\
         For each question, provide:\n\
         1. A question\n\
         2. Four answer options (A, B, C, D)\n\
         3. The correct answer letter\n\
         4. A brief explanation of why the answer is correct\n\
         \n\
         Return ONLY a pure JSON array of question objects. Do NOT include markdown \
         formatting or code blocks like ```json, and no intro text or commentary.\n\
         Each object must have:\n\
         - \"question\": string\n\
         - \"options\": list of 4 strings\n\
         - \"correct_answer\": \"A\" | \"B\" | \"C\" | \"D\"\n\
         - \"explanation\": string\n\
         \n\
         JSON output only:",
        topic = request.topic,
        context = context,
        count = request.requested_count,
        difficulty = request.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
    );

    Prompt {
        system: QUIZ_SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn tutor(request: &GenerationRequest) -> Prompt {
    let context_block = match request.source_text.as_deref() {
        Some(context) if !context.trim().is_empty() => format!("\nContext: {}\n", context),
        _ => String::new(),
    };

    let user = format!(
        "As an educational AI tutor, please answer the following question:\n\
         \n\
         Question: {question}\n\
         {context_block}\n\
         Provide a clear, accurate, and educational response suitable for a student.\n\
         Include explanations of concepts and examples where helpful.",
        question = request.topic,
        context_block = context_block,
    );

    Prompt {
        system: TUTOR_SYSTEM_PROMPT.to_string(),
        user,
    }
}

fn recommendations(request: &GenerationRequest) -> Prompt {
    let user = format!(
        "Analyze the following study data and provide personalized recommendations:\n\
         \n\
         {stats}\n\
         \n\
         Provide 3-5 specific, actionable recommendations to improve study habits based on \
         this data.\n\
         Format your response as a JSON object with an array of recommendation strings under \
         the key \"recommendations\". Do NOT include markdown formatting or code blocks.",
        stats = request.source_text.as_deref().unwrap_or(""),
    );

    Prompt {
        system: RECOMMENDATIONS_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Truncate to at most `budget` bytes without splitting a character.
fn truncate(text: &str, budget: usize) -> &str {
    if text.len() <= budget {
        return text;
    }
    let mut end = budget;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationRequest;

    #[test]
    fn flashcard_prompt_includes_topic_and_terms() {
        let req = GenerationRequest::flashcards("Biology", "cells divide", 5);
        let terms = vec!["cells".to_string(), "divide".to_string()];
        let prompt = build(&req, &terms);
        assert_eq!(prompt.system, FLASHCARD_SYSTEM_PROMPT);
        assert!(prompt.user.contains("Biology"));
        assert!(prompt.user.contains("cells, divide"));
        assert!(prompt.user.contains("Do NOT include markdown"));
    }

    #[test]
    fn flashcard_source_text_is_truncated() {
        let long = "x".repeat(10_000);
        let req = GenerationRequest::flashcards("Topic", &long, 5);
        let prompt = build(&req, &[]);
        // prompt holds the truncated text plus template overhead, never the full input
        assert!(prompt.user.len() < 4000);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "é".repeat(2000); // two bytes per char
        let cut = truncate(&text, 3001);
        assert_eq!(cut.len(), 3000);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn quiz_prompt_without_context_uses_general_knowledge() {
        let req = GenerationRequest::quiz("History", 4, 10, None);
        let prompt = build(&req, &[]);
        assert!(prompt.user.contains("general knowledge"));
        assert!(prompt.user.contains("10 questions at difficulty level 4/5"));
    }

    #[test]
    fn quiz_prompt_with_context_embeds_it() {
        let req = GenerationRequest::quiz("History", 2, 5, Some("The Treaty of Westphalia..."));
        let prompt = build(&req, &[]);
        assert!(prompt.user.contains("Treaty of Westphalia"));
        assert!(!prompt.user.contains("general knowledge"));
    }

    #[test]
    fn tutor_prompt_embeds_optional_context() {
        let with = build(&GenerationRequest::tutor("What is DNA?", Some("Genetics unit")), &[]);
        assert!(with.user.contains("Question: What is DNA?"));
        assert!(with.user.contains("Context: Genetics unit"));

        let without = build(&GenerationRequest::tutor("What is DNA?", None), &[]);
        assert!(!without.user.contains("Context:"));
    }
}
