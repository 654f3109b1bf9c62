//! Generator abstractions for colander-runtime.
//!
//! The generative model is an external collaborator with exactly one
//! capability: given a prompt, produce a raw candidate answer. Everything the
//! pipeline knows about it goes through the [`Generator`] trait, so the
//! validation logic can be tested deterministically with a canned stub.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpGenerator;

/// Errors from generators.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

/// Sampling and decoding parameters for a generation request.
///
/// The output-length limit is the bound on a generation call; there is no
/// wall-clock deadline and no retry on failure.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate.
    pub max_new_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Beam count for beam-search decoding.
    pub num_beams: u32,

    /// Block repeats of n-grams of this size.
    pub no_repeat_ngram_size: u32,

    /// Padding token override, when the serving stack needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad_token: Option<String>,

    /// End-of-sequence token override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eos_token: Option<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 80,
            temperature: 0.05,
            num_beams: 12,
            no_repeat_ngram_size: 3,
            pad_token: None,
            eos_token: None,
        }
    }
}

/// The single capability the pipeline requires of a generative model.
///
/// # Contract
/// - One prompt in, one candidate answer out; non-deterministic and
///   latency-bearing.
/// - A failed call is terminal for the request: the pipeline performs no
///   retries.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a raw candidate answer for a prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GeneratorError>;

    /// Check if the generator is reachable/configured.
    async fn health_check(&self) -> bool {
        true
    }

    /// Generator name for diagnostics.
    fn name(&self) -> &str;
}

/// A generator that always returns the same text.
///
/// Used by tests and by offline CLI runs to exercise the validation pipeline
/// without a model behind it.
#[derive(Debug, Clone)]
pub struct CannedGenerator {
    output: String,
}

impl CannedGenerator {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, GeneratorError> {
        Ok(self.output.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}
