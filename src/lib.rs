//! Studygen - generation pipeline for study content.
//!
//! Turns raw study text or a bare topic into schema-valid flashcards and
//! multiple-choice quiz questions, despite an unreliable free-text completion
//! upstream. The pipeline layers key-term extraction, prompt assembly, a
//! prioritized multi-model fallback chain, heuristic response sanitization,
//! strict structural validation and deterministic synthetic fallback.
//!
//! The crate is the generation core only: no web layer, no authentication,
//! no persistence. Callers construct a [`GenerationOrchestrator`] with an
//! injected [`PipelineConfig`] and call its operations directly.

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod habits;
pub mod key_terms;
pub mod orchestrator;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod types;

pub use client::{CompletionClient, FakeCompletionClient, HttpCompletionClient};
pub use config::PipelineConfig;
pub use error::{AttemptError, RequestError};
pub use habits::adjust_quiz_difficulty;
pub use orchestrator::GenerationOrchestrator;
pub use sanitize::PayloadShape;
pub use types::{
    ArtifactKind, Flashcard, GenerationRequest, GenerationResult, Origin, QuizQuestion,
};
