//! Error taxonomy for the generation pipeline.
//!
//! Attempt-level failures are recoverable: the orchestrator consumes them as
//! retry/advance signals and none of them escape the pipeline. The only
//! caller-visible failures are precondition rejections made before the
//! pipeline is entered.

use crate::sanitize::PayloadShape;

/// Failure of a single generation attempt.
///
/// The first six variants come from the completion client, one per distinct
/// upstream failure mode. `Sanitization` and `Schema` are produced by the
/// later pipeline stages. All variants are `Clone` so fake clients can script
/// them in tests.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AttemptError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    #[error("upstream sent non-JSON content type: {0:?}")]
    NonJsonContentType(String),

    #[error("malformed completion envelope: {0}")]
    MalformedEnvelope(String),

    #[error("completion content was empty")]
    EmptyContent,

    #[error("no {expected} found in completion text")]
    Sanitization {
        expected: PayloadShape,
        /// The cleaned-but-unparseable text, retained for diagnostics.
        cleaned: String,
    },

    #[error("schema violation in item {index}: {reason}")]
    Schema { index: usize, reason: String },
}

impl AttemptError {
    /// Short outcome tag for structured attempt logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Network(_) => "network",
            AttemptError::Timeout(_) => "timeout",
            AttemptError::HttpStatus(_) => "http_status",
            AttemptError::NonJsonContentType(_) => "non_json_content_type",
            AttemptError::MalformedEnvelope(_) => "malformed_envelope",
            AttemptError::EmptyContent => "empty_content",
            AttemptError::Sanitization { .. } => "sanitization",
            AttemptError::Schema { .. } => "schema",
        }
    }
}

/// Caller-visible precondition failures, rejected before any model is tried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("topic must not be blank")]
    BlankTopic,

    #[error("requested question count must be at least 1")]
    ZeroCount,

    #[error("difficulty must be between 1 and 5, got {0}")]
    DifficultyOutOfRange(u8),
}
