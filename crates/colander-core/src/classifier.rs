//! Domain admission control.
//!
//! **Question**: Is this a recipe question at all?
//!
//! Admission is a single deterministic pass: a charset gate first (guards
//! against non-target-script injection), then a keyword vocabulary, then a
//! small set of interrogative templates that pair "how"/"what" with a domain
//! noun. Classification is pure; rejection logging is the caller's concern.

use lazy_static::lazy_static;
use regex::Regex;

use crate::patterns::is_allowed_charset;
use crate::types::{Admission, RejectReason};

lazy_static! {
    /// Fixed domain vocabulary: cooking verbs, dish categories, meal times,
    /// kitchen equipment, nutrition terms.
    static ref DOMAIN_KEYWORDS: Vec<&'static str> = vec![
        "cook", "recipe", "ingredient", "serving", "bake", "fry", "boil", "grill", "roast",
        "prep", "prepare", "time", "dish", "food", "cuisine", "dessert", "appetizer",
        "main", "side", "breakfast", "lunch", "dinner", "snack", "oven", "stove", "pan",
        "pot", "mix", "chop", "slice", "season", "taste", "flavor", "sauce", "soup", "salad",
        "rating", "calories", "calorie", "nutrition", "nutritional", "serves", "yield",
    ];

    /// Interrogative templates accepted even without a bare keyword hit.
    static ref DOMAIN_TEMPLATES: Vec<Regex> = vec![
        Regex::new(r"\bhow\b.*\b(cook|make|prepare|bake|recipe|calories|calorie|nutrition|serving)\b").unwrap(),
        Regex::new(r"\bwhat\b.*\b(ingredient|dish|recipe|rating|calories|calorie|nutrition|serving)\b").unwrap(),
        Regex::new(r"\bhow\b.*\b(long|time|many)\b.*\b(serving|prep|cook|calories|calorie|nutrition)\b").unwrap(),
        Regex::new(r"\b(ingredient|step|method|rating|calories|calorie|nutrition)\b.*\b(recipe|dish)\b").unwrap(),
    ];
}

/// Admits or rejects a question as being in the recipe domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainClassifier;

impl DomainClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a question.
    ///
    /// The charset gate runs first; only a fully-allowed question is checked
    /// against the vocabulary and templates.
    pub fn classify(&self, question: &str) -> Admission {
        let lowered = question.trim().to_lowercase();

        if !is_allowed_charset(&lowered) {
            tracing::debug!("question failed the charset gate");
            return Admission::Rejected(RejectReason::InvalidCharset);
        }

        let keyword_hit = DOMAIN_KEYWORDS.iter().any(|kw| lowered.contains(kw));
        let template_hit = || DOMAIN_TEMPLATES.iter().any(|re| re.is_match(&lowered));

        if keyword_hit || template_hit() {
            Admission::Admitted
        } else {
            Admission::Rejected(RejectReason::OffTopic)
        }
    }

    /// Convenience wrapper over [`classify`](Self::classify).
    pub fn is_in_domain(&self, question: &str) -> bool {
        self.classify(question).is_admitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_admits_regardless_of_casing() {
        let classifier = DomainClassifier::new();
        assert!(classifier.is_in_domain("How do I BAKE bread?"));
        assert!(classifier.is_in_domain("CHICKEN SOUP RECIPE"));
        assert!(classifier.is_in_domain("calories in a salad?"));
    }

    #[test]
    fn test_template_admits_without_bare_keyword() {
        let classifier = DomainClassifier::new();
        // "make" is not in the vocabulary; the "how ... make" template admits it.
        assert!(classifier.is_in_domain("How do you make lasagna?"));
    }

    #[test]
    fn test_off_topic_rejected() {
        let classifier = DomainClassifier::new();
        assert_eq!(
            classifier.classify("What is the capital of France?"),
            Admission::Rejected(RejectReason::OffTopic)
        );
        assert!(!classifier.is_in_domain("Tell me about quantum physics"));
    }

    #[test]
    fn test_invalid_charset_rejected_before_keywords() {
        let classifier = DomainClassifier::new();
        // Contains a domain keyword but fails the charset gate.
        assert_eq!(
            classifier.classify("recipe для борща"),
            Admission::Rejected(RejectReason::InvalidCharset)
        );
        assert_eq!(
            classifier.classify("soup; rm -rf $HOME"),
            Admission::Rejected(RejectReason::InvalidCharset)
        );
    }

    #[test]
    fn test_empty_question_rejected() {
        let classifier = DomainClassifier::new();
        assert_eq!(
            classifier.classify(""),
            Admission::Rejected(RejectReason::InvalidCharset)
        );
        assert_eq!(
            classifier.classify("   "),
            Admission::Rejected(RejectReason::InvalidCharset)
        );
    }

    #[test]
    fn test_allowed_punctuation_admitted() {
        let classifier = DomainClassifier::new();
        assert!(classifier.is_in_domain("Bake at 350°F - how long, 20-25 minutes?"));
    }
}
