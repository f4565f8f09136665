//! Pipeline configuration.
//!
//! All upstream coordinates are injected at construction. The API key is
//! never embedded as a literal; use [`PipelineConfig::from_env`] to pick it
//! up from the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenRouter-compatible chat-completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Environment variable holding the completion-service credential.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default model-candidate chain, tried in priority order.
pub const DEFAULT_MODELS: [&str; 2] = [
    "deepseek/deepseek-r1:free",
    "meta-llama/llama-3.1-8b-instruct:free",
];

/// Configuration for the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Chat-completions endpoint URL.
    pub base_url: String,

    /// Bearer credential. Requests are sent unauthenticated when absent.
    pub api_key: Option<String>,

    /// Ordered model-candidate chain. Must be non-empty.
    pub models: Vec<String>,

    /// Retry budget per model.
    pub attempts_per_model: u32,

    /// Pause between retries of the same model. No pause when advancing to
    /// the next model.
    pub backoff: Duration,

    /// Per-attempt HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Optional `HTTP-Referer` header identifying the calling app.
    pub referer: Option<String>,

    /// Optional `X-Title` header identifying the calling app.
    pub app_title: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            attempts_per_model: 2,
            backoff: Duration::from_secs(1),
            timeout_secs: 30,
            referer: None,
            app_title: None,
        }
    }
}

impl PipelineConfig {
    /// Default configuration with the API key read from `OPENROUTER_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).ok(),
            ..Self::default()
        }
    }

    /// Replace the model-candidate chain.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Replace the per-model retry budget.
    pub fn with_attempts_per_model(mut self, attempts: u32) -> Self {
        self.attempts_per_model = attempts;
        self
    }

    /// Replace the retry backoff.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0], "deepseek/deepseek-r1:free");
        assert_eq!(config.attempts_per_model, 2);
        assert_eq!(config.backoff, Duration::from_secs(1));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn builder_overrides() {
        let config = PipelineConfig::default()
            .with_models(vec!["test/model".to_string()])
            .with_attempts_per_model(3)
            .with_backoff(Duration::ZERO);
        assert_eq!(config.models, vec!["test/model".to_string()]);
        assert_eq!(config.attempts_per_model, 3);
        assert_eq!(config.backoff, Duration::ZERO);
    }
}
