//! # colander-core
//!
//! Deterministic answer validation for recipe question-answering.
//!
//! A generative model constrained to a single domain still produces answers
//! that echo the prompt, leak dataset labels, repeat themselves, or make
//! implausible numeric claims. This crate is the deterministic half of the
//! system, answering:
//! - Is this question in the recipe domain at all?
//! - What should the raw answer look like before a caller sees it?
//! - Which parts of the answer look factually suspect?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No LLM calls**: All validation is rule-based
//! 3. **Pure**: No I/O; rejection logging belongs to the runtime
//! 4. **Configurable**: All tables live in a [`RuleSet`] built once and
//!    passed into the constructors
//!
//! ## Example
//!
//! ```rust,ignore
//! use colander_core::{validate_answer, DomainClassifier, RuleSet};
//!
//! let rules = RuleSet::default();
//! let classifier = DomainClassifier::new();
//!
//! let question = "How many calories in chicken soup?";
//! assert!(classifier.is_in_domain(question));
//!
//! let (answer, errors) = validate_answer("soup has 900 calories", question, None, &rules);
//! ```

pub mod classifier;
pub mod detect;
pub mod normalize;
pub mod patterns;
pub mod rules;
pub mod types;

// Re-export main types at crate root
pub use classifier::DomainClassifier;
pub use detect::FactualErrorDetector;
pub use normalize::OutputNormalizer;
pub use rules::{
    CalorieRule, CalorieTable, LexicalFix, PhraseCategory, RuleSet, RulesError, Tolerances,
    validate_ruleset_schema,
};
pub use types::{
    Admission, ErrorTag, RejectReason, FALLBACK_SENTENCE, GENERATION_FAILURE_SENTENCE,
    NON_ENGLISH_SENTENCE, REFUSAL_SENTENCE,
};

/// Normalize a raw answer and detect factual errors in one call.
///
/// Convenience entry point for callers that do not keep the normalizer and
/// detector around; the pipeline constructs both once instead.
pub fn validate_answer(
    raw: &str,
    question: &str,
    expected: Option<&str>,
    rules: &RuleSet,
) -> (String, Vec<ErrorTag>) {
    let normalizer = OutputNormalizer::new(rules);
    let detector = FactualErrorDetector::new(rules);

    let answer = normalizer.normalize(raw, question);
    let errors = detector.detect(&answer, question, expected);
    (answer, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_answer_normalizes_then_detects() {
        let rules = RuleSet::default();
        let (answer, errors) = validate_answer(
            "The soup has 900 calories and is ready in 30 minutes.",
            "How many calories in chicken soup?",
            None,
            &rules,
        );

        // The clamp rewrites the claim, so only the range finding remains
        // possible on the original figure - and it is gone after rewriting.
        assert!(answer.contains("a specific calorie count"));
        assert_eq!(errors, vec![ErrorTag::MissingCalorieInfo]);
    }

    #[test]
    fn test_validate_answer_clean_path() {
        let rules = RuleSet::default();
        let (answer, errors) = validate_answer(
            "Simmer the soup for 45 minutes and season well.",
            "How long does chicken soup take to cook?",
            None,
            &rules,
        );

        assert_eq!(answer, "Simmer the soup for 45 minutes and season well.");
        assert!(errors.is_empty());
    }
}
