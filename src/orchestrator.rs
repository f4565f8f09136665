//! Generation orchestrator: drives the model-fallback retry matrix.
//!
//! For each model candidate in priority order: build the prompt, call the
//! completion client, sanitize, validate. Any failure consumes one attempt;
//! when a model's retry budget is spent the chain advances to the next
//! candidate. The first validated result short-circuits the chain. When
//! every candidate is exhausted the synthesizer produces a deterministic
//! fallback, so exhaustion never surfaces to the caller.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{CompletionClient, HttpCompletionClient};
use crate::config::PipelineConfig;
use crate::error::{AttemptError, RequestError};
use crate::fallback;
use crate::habits;
use crate::key_terms::extract_key_terms;
use crate::prompt;
use crate::sanitize::{extract_json, PayloadShape};
use crate::schema;
use crate::types::{Flashcard, GenerationRequest, GenerationResult, Origin, QuizQuestion};

/// Flashcards targeted per generation.
const FLASHCARD_COUNT: usize = 5;

const FLASHCARD_MAX_TOKENS: u32 = 1000;
const QUIZ_MAX_TOKENS: u32 = 100_000;
const TUTOR_MAX_TOKENS: u32 = 100_000;
const RECOMMENDATIONS_MAX_TOKENS: u32 = 600;

/// Drives generation requests through the model-fallback chain.
pub struct GenerationOrchestrator {
    client: Box<dyn CompletionClient>,
    config: PipelineConfig,
}

impl GenerationOrchestrator {
    /// Orchestrator backed by the HTTP completion client.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = HttpCompletionClient::new(&config)?;
        Self::with_client(Box::new(client), config)
    }

    /// Orchestrator over any completion backend; used with fakes in tests.
    pub fn with_client(client: Box<dyn CompletionClient>, config: PipelineConfig) -> Result<Self> {
        if config.models.is_empty() {
            anyhow::bail!("model candidate list must not be empty");
        }
        Ok(Self { client, config })
    }

    /// Generate flashcards from study text. Targets five cards.
    pub fn generate_flashcards(
        &self,
        text: &str,
        topic: &str,
    ) -> Result<GenerationResult<Flashcard>, RequestError> {
        self.flashcards_inner(text, topic, None)
    }

    /// Deadline-bounded variant: once `deadline` passes, no further attempt
    /// is started and the chain falls back. An in-flight call is still
    /// bounded by the per-attempt timeout rather than aborted.
    pub fn generate_flashcards_with_deadline(
        &self,
        text: &str,
        topic: &str,
        deadline: Instant,
    ) -> Result<GenerationResult<Flashcard>, RequestError> {
        self.flashcards_inner(text, topic, Some(deadline))
    }

    fn flashcards_inner(
        &self,
        text: &str,
        topic: &str,
        deadline: Option<Instant>,
    ) -> Result<GenerationResult<Flashcard>, RequestError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(RequestError::BlankTopic);
        }

        let key_terms = extract_key_terms(text);
        debug!(topic, terms = ?key_terms, "extracted key terms");

        let request = GenerationRequest::flashcards(topic, text, FLASHCARD_COUNT);
        Ok(self.run_chain(
            &request,
            &key_terms,
            FLASHCARD_MAX_TOKENS,
            deadline,
            |payload| schema::validate_flashcards(payload, FLASHCARD_COUNT),
            || fallback::flashcards(topic, &key_terms),
        ))
    }

    /// Generate a multiple-choice quiz about a topic, optionally grounded in
    /// caller-supplied context text.
    pub fn generate_quiz(
        &self,
        topic: &str,
        difficulty: u8,
        num_questions: usize,
        context_text: Option<&str>,
    ) -> Result<GenerationResult<QuizQuestion>, RequestError> {
        self.quiz_inner(topic, difficulty, num_questions, context_text, None)
    }

    /// Deadline-bounded variant of [`generate_quiz`](Self::generate_quiz).
    pub fn generate_quiz_with_deadline(
        &self,
        topic: &str,
        difficulty: u8,
        num_questions: usize,
        context_text: Option<&str>,
        deadline: Instant,
    ) -> Result<GenerationResult<QuizQuestion>, RequestError> {
        self.quiz_inner(topic, difficulty, num_questions, context_text, Some(deadline))
    }

    fn quiz_inner(
        &self,
        topic: &str,
        difficulty: u8,
        num_questions: usize,
        context_text: Option<&str>,
        deadline: Option<Instant>,
    ) -> Result<GenerationResult<QuizQuestion>, RequestError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(RequestError::BlankTopic);
        }
        if num_questions == 0 {
            return Err(RequestError::ZeroCount);
        }
        if !(1..=5).contains(&difficulty) {
            return Err(RequestError::DifficultyOutOfRange(difficulty));
        }

        let request = GenerationRequest::quiz(topic, difficulty, num_questions, context_text);
        Ok(self.run_chain(
            &request,
            &[],
            QUIZ_MAX_TOKENS,
            deadline,
            |payload| schema::validate_quiz(payload, num_questions),
            || fallback::quiz(topic, num_questions),
        ))
    }

    /// Single-call tutor path: the raw completion text is the answer. No
    /// schema validation, no model chain; a fixed apology covers every
    /// failure.
    pub fn ask_tutor(&self, question: &str, context: Option<&str>) -> String {
        let question = question.trim();
        if question.is_empty() {
            return fallback::TUTOR_APOLOGY.to_string();
        }

        let Some(model) = self.config.models.first() else {
            return fallback::TUTOR_APOLOGY.to_string();
        };

        let request = GenerationRequest::tutor(question, context);
        let message = prompt::build(&request, &[]);

        match self
            .client
            .complete(model, &message.system, &message.user, TUTOR_MAX_TOKENS, false)
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!(
                    model = %model,
                    outcome = err.kind(),
                    error = %err,
                    "tutor call failed, returning apology"
                );
                fallback::TUTOR_APOLOGY.to_string()
            }
        }
    }

    /// Single-call habit analysis. Returns the model's recommendation list,
    /// or a fixed three-item list on any failure.
    pub fn analyze_study_habits(
        &self,
        topic_minutes: &BTreeMap<String, u32>,
        quiz_scores: &[u32],
        mastery_fraction: f64,
    ) -> Vec<String> {
        let Some(model) = self.config.models.first() else {
            return fallback::recommendations();
        };

        let stats = habits::render_study_stats(topic_minutes, quiz_scores, mastery_fraction);
        let request = GenerationRequest::recommendations(&stats);
        let message = prompt::build(&request, &[]);

        let payload = self
            .client
            .complete(
                model,
                &message.system,
                &message.user,
                RECOMMENDATIONS_MAX_TOKENS,
                true,
            )
            .and_then(|raw| {
                extract_json(&raw, PayloadShape::Object)
                    .or_else(|_| extract_json(&raw, PayloadShape::Array))
            });

        match payload {
            Ok(value) => habits::extract_recommendations(&value).unwrap_or_else(|| {
                warn!(model = %model, "analysis payload held no recommendation list");
                fallback::recommendations()
            }),
            Err(err) => {
                warn!(
                    model = %model,
                    outcome = err.kind(),
                    error = %err,
                    "habit analysis failed, returning default recommendations"
                );
                fallback::recommendations()
            }
        }
    }

    /// The retry matrix: models in priority order, a fixed attempt budget
    /// per model, backoff between retries of the same model only.
    fn run_chain<T>(
        &self,
        request: &GenerationRequest,
        key_terms: &[String],
        max_tokens: u32,
        deadline: Option<Instant>,
        validate: impl Fn(&Value) -> Result<Vec<T>, AttemptError>,
        synthesize: impl FnOnce() -> Vec<T>,
    ) -> GenerationResult<T> {
        let artifact = request.kind.as_str();
        let message = prompt::build(request, key_terms);
        let mut attempts_made = 0u32;

        'chain: for model in &self.config.models {
            for attempt in 1..=self.config.attempts_per_model {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    warn!(artifact, model = %model, attempts_made, "request deadline passed, abandoning chain");
                    break 'chain;
                }
                attempts_made += 1;

                match self.attempt(model, &message, max_tokens, &validate) {
                    Ok(items) => {
                        info!(
                            artifact,
                            model = %model,
                            attempt,
                            attempts_made,
                            items = items.len(),
                            "generation succeeded"
                        );
                        return GenerationResult {
                            items,
                            origin: Origin::Model,
                            model_used: Some(model.clone()),
                            attempts_made,
                        };
                    }
                    Err(err) => {
                        warn!(
                            artifact,
                            model = %model,
                            attempt,
                            outcome = err.kind(),
                            error = %err,
                            "generation attempt failed"
                        );
                        if let AttemptError::Sanitization { cleaned, .. } = &err {
                            debug!(artifact, model = %model, cleaned, "unparseable completion text");
                        }
                        if attempt < self.config.attempts_per_model {
                            std::thread::sleep(self.config.backoff);
                        }
                    }
                }
            }
            debug!(artifact, model = %model, "retry budget exhausted, advancing to next model");
        }

        warn!(artifact, attempts_made, "all models exhausted, synthesizing fallback");
        GenerationResult {
            items: synthesize(),
            origin: Origin::Fallback,
            model_used: None,
            attempts_made,
        }
    }

    /// One attempt: call, sanitize, validate. Flashcard and quiz payloads
    /// are arrays at the top level.
    fn attempt<T>(
        &self,
        model: &str,
        message: &prompt::Prompt,
        max_tokens: u32,
        validate: &impl Fn(&Value) -> Result<Vec<T>, AttemptError>,
    ) -> Result<Vec<T>, AttemptError> {
        let raw = self
            .client
            .complete(model, &message.system, &message.user, max_tokens, true)?;
        let payload = extract_json(&raw, PayloadShape::Array)?;
        validate(&payload)
    }
}
