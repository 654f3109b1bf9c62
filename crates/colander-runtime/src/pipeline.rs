//! Answer pipeline orchestration.
//!
//! The pipeline composes admission, generation, normalization, and detection
//! in a fixed sequence:
//!
//! question -> DomainClassifier (reject early) -> Generator -> charset gate
//! -> OutputNormalizer -> FactualErrorDetector -> [`AnswerReport`]
//!
//! Every path terminates in a well-formed report; generator failures are
//! caught, logged, and converted to a fixed error sentence. The pipeline is
//! stateless per invocation and safe to share across concurrent requests -
//! the diagnostic log is the only shared sink.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use colander_core::patterns::is_allowed_charset;
use colander_core::types::{
    Admission, RejectReason, GENERATION_FAILURE_SENTENCE, NON_ENGLISH_SENTENCE, REFUSAL_SENTENCE,
};
use colander_core::{DomainClassifier, FactualErrorDetector, OutputNormalizer, RuleSet};

use crate::diagnostics::{DiagnosticLog, LogCategory};
use crate::generator::{GenerationParams, Generator};
use crate::prompts::build_prompt;
use crate::report::AnswerReport;

/// Errors from pipeline construction. Answering itself never fails.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Generator not configured: {0}")]
    GeneratorNotConfigured(String),
}

/// The answer pipeline.
pub struct AnswerPipeline {
    classifier: DomainClassifier,
    normalizer: OutputNormalizer,
    detector: FactualErrorDetector,
    generator: Arc<dyn Generator>,
    params: GenerationParams,
    log: DiagnosticLog,
}

impl AnswerPipeline {
    /// Start building a pipeline.
    pub fn builder() -> AnswerPipelineBuilder {
        AnswerPipelineBuilder::new()
    }

    /// Answer a simple query: validated answer only, detection skipped.
    pub async fn answer(&self, question: &str) -> AnswerReport {
        self.run(question, None, false).await
    }

    /// Answer a detailed query: runs factual-error detection, optionally
    /// against a reference answer.
    pub async fn answer_detailed(&self, question: &str, expected: Option<&str>) -> AnswerReport {
        self.run(question, expected, true).await
    }

    async fn run(&self, question: &str, expected: Option<&str>, detailed: bool) -> AnswerReport {
        match self.classifier.classify(question) {
            Admission::Rejected(RejectReason::InvalidCharset) => {
                self.log.append(LogCategory::InvalidQuestion, question);
                return AnswerReport::without_generation(REFUSAL_SENTENCE);
            }
            Admission::Rejected(RejectReason::OffTopic) => {
                self.log.append(LogCategory::NonRecipe, question);
                return AnswerReport::without_generation(REFUSAL_SENTENCE);
            }
            Admission::Admitted => {}
        }

        let prompt = build_prompt(question);

        let started = Instant::now();
        let generated = self.generator.generate(&prompt, &self.params).await;
        let generation_secs = started.elapsed().as_secs_f64();

        let raw = match generated {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(generator = self.generator.name(), error = %e, "generation failed");
                self.log
                    .append(LogCategory::Error, &format!("{} -> {}", question, e));
                return AnswerReport {
                    answer: GENERATION_FAILURE_SENTENCE.to_string(),
                    raw_answer: None,
                    generation_secs,
                    errors: Vec::new(),
                };
            }
        };

        // Same gate the question passed: raw output in an unexpected script
        // is returned as a fixed error, with the evidence logged.
        if !is_allowed_charset(&raw) {
            self.log.append(
                LogCategory::NonEnglish,
                &format!("{} -> {}", question, raw),
            );
            return AnswerReport {
                answer: NON_ENGLISH_SENTENCE.to_string(),
                raw_answer: Some(raw),
                generation_secs,
                errors: Vec::new(),
            };
        }

        let answer = self.normalizer.normalize(&raw, question);
        let errors = if detailed {
            self.detector.detect(&answer, question, expected)
        } else {
            Vec::new()
        };

        AnswerReport {
            answer,
            raw_answer: Some(raw),
            generation_secs,
            errors,
        }
    }
}

/// Builder for [`AnswerPipeline`].
pub struct AnswerPipelineBuilder {
    generator: Option<Arc<dyn Generator>>,
    rules: RuleSet,
    params: GenerationParams,
    log: Option<DiagnosticLog>,
}

impl AnswerPipelineBuilder {
    pub fn new() -> Self {
        Self {
            generator: None,
            rules: RuleSet::default(),
            params: GenerationParams::default(),
            log: None,
        }
    }

    /// Set the generator (required).
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Override the rule set.
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Override generation parameters.
    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Attach a diagnostic log. Without one, diagnostics are dropped.
    pub fn log(mut self, log: DiagnosticLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<AnswerPipeline, PipelineError> {
        let generator = self.generator.ok_or_else(|| {
            PipelineError::GeneratorNotConfigured("no generator set".to_string())
        })?;

        Ok(AnswerPipeline {
            classifier: DomainClassifier::new(),
            normalizer: OutputNormalizer::new(&self.rules),
            detector: FactualErrorDetector::new(&self.rules),
            generator,
            params: self.params,
            log: self.log.unwrap_or_else(DiagnosticLog::disabled),
        })
    }
}

impl Default for AnswerPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
