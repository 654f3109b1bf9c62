//! HTTP inference-server generator.
//!
//! Talks to a text-generation serving endpoint (TGI-style `/generate`
//! contract: `{"inputs": ..., "parameters": ...}` in, `{"generated_text":
//! ...}` out).
//!
//! ## Security
//!
//! The optional bearer token is held in a [`SecretString`]: it cannot appear
//! in `Debug` output and is only exposed at the point of use.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GenerationParams, Generator, GeneratorError};

/// Environment variable for the inference-server URL.
pub const GENERATOR_URL_ENV: &str = "COLANDER_GENERATOR_URL";

/// Environment variable for the optional bearer token.
pub const GENERATOR_TOKEN_ENV: &str = "COLANDER_GENERATOR_TOKEN";

/// Generator backed by an HTTP inference server.
pub struct HttpGenerator {
    endpoint: String,
    token: Option<SecretString>,
    request_timeout: Duration,
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("endpoint", &self.endpoint)
            .field(
                "token",
                &self.token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl HttpGenerator {
    /// Create a generator for an endpoint base URL (e.g.
    /// `http://localhost:8080`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create from `COLANDER_GENERATOR_URL`, picking up
    /// `COLANDER_GENERATOR_TOKEN` when set.
    pub fn from_env() -> Result<Self, GeneratorError> {
        let endpoint = std::env::var(GENERATOR_URL_ENV).map_err(|_| {
            GeneratorError::NotConfigured(format!(
                "inference server URL not set: configure '{}' environment variable",
                GENERATOR_URL_ENV
            ))
        })?;

        let mut generator = Self::new(endpoint);
        if let Ok(token) = std::env::var(GENERATOR_TOKEN_ENV) {
            generator.token = Some(SecretString::from(token));
        }
        Ok(generator)
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn get_client(&self) -> &reqwest::Client {
        static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client")
        })
    }
}

/// Serving-endpoint request format.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// Serving-endpoint response format.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateErrorBody {
    error: String,
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GeneratorError> {
        let client = self.get_client();

        let request = GenerateRequest {
            inputs: prompt,
            parameters: params,
        };

        let mut builder = client
            .post(format!("{}/generate", self.endpoint.trim_end_matches('/')))
            .header("content-type", "application/json")
            .timeout(self.request_timeout)
            .json(&request);

        // SECURITY: expose the token only here, at the point of use
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GeneratorError::Timeout(self.request_timeout)
            } else {
                GeneratorError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(GeneratorError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response
                .json::<GenerateErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "unreadable error body".to_string());

            return Err(GeneratorError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::ParseError(e.to_string()))?;

        Ok(body.generated_text)
    }

    async fn health_check(&self) -> bool {
        !self.endpoint.is_empty()
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let generator = HttpGenerator::new("http://localhost:8080");
        assert_eq!(generator.name(), "http");
    }

    #[test]
    fn test_token_not_in_debug_output() {
        let secret = "tok-super-secret-12345";
        let generator = HttpGenerator::new("http://localhost:8080").with_token(secret);

        let debug_output = format!("{:?}", generator);
        assert!(
            !debug_output.contains(secret),
            "bearer token was exposed in Debug output!"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_request_serialization() {
        let params = GenerationParams::default();
        let request = GenerateRequest {
            inputs: "question: how long to cook soup?",
            parameters: &params,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "question: how long to cook soup?");
        assert_eq!(json["parameters"]["num_beams"], 12);
    }

    #[tokio::test]
    async fn test_health_check_requires_endpoint() {
        assert!(HttpGenerator::new("http://localhost:8080").health_check().await);
        assert!(!HttpGenerator::new("").health_check().await);
    }
}
