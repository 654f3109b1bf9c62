//! Heuristic factual-error detection.
//!
//! **Question**: Does this answer contradict itself, the dish category, or
//! the reference answer?
//!
//! Detection never mutates the answer; it returns advisory [`ErrorTag`]s in
//! check order. Reference comparisons only run when the caller supplies an
//! expected answer carrying the same kind of figure.

use crate::patterns::{find_calories, find_duration, find_rating};
use crate::rules::{CalorieTable, PhraseCategory, RuleSet, Tolerances};
use crate::types::ErrorTag;

/// Inspects normalized answers for suspected factual inconsistencies.
pub struct FactualErrorDetector {
    patterns: Vec<PhraseCategory>,
    calories: CalorieTable,
    tolerances: Tolerances,
}

impl FactualErrorDetector {
    /// Build a detector over a rule set. Phrases are lower-cased once here so
    /// the scan itself is allocation-light.
    pub fn new(rules: &RuleSet) -> Self {
        let patterns = rules
            .error_patterns
            .iter()
            .map(|category| PhraseCategory {
                tag: category.tag,
                phrases: category.phrases.iter().map(|p| p.to_lowercase()).collect(),
            })
            .collect();

        Self {
            patterns,
            calories: rules.calories.clone(),
            tolerances: rules.tolerances,
        }
    }

    /// Detect factual errors in an answer.
    ///
    /// Refusal and error sentences short-circuit to a single
    /// `non_recipe_or_error` tag; everything else runs the full check
    /// sequence. The prefix check is deliberately case-sensitive: only the
    /// pipeline's own fixed sentences start with "Sorry" or "Error".
    pub fn detect(
        &self,
        answer: &str,
        question: &str,
        expected: Option<&str>,
    ) -> Vec<ErrorTag> {
        if answer.starts_with("Sorry") || answer.starts_with("Error") {
            return vec![ErrorTag::NonRecipeOrError];
        }

        let answer_lower = answer.to_lowercase();
        let question_lower = question.to_lowercase();
        let expected_lower = expected.map(str::to_lowercase);

        let mut errors = Vec::new();

        // Phrase categories, each contributing its tag at most once.
        for category in &self.patterns {
            if category
                .phrases
                .iter()
                .any(|phrase| answer_lower.contains(phrase))
            {
                errors.push(category.tag);
            }
        }

        if question_lower.contains("calories") {
            self.check_calories(
                &answer_lower,
                &question_lower,
                expected_lower.as_deref(),
                &mut errors,
            );
        }

        if question_lower.contains("rating") {
            self.check_rating(&answer_lower, expected_lower.as_deref(), &mut errors);
        }

        if question_lower.contains("time") {
            self.check_duration(&answer_lower, expected_lower.as_deref(), &mut errors);
        }

        if has_adjacent_repeat(&answer_lower) {
            errors.push(ErrorTag::RepetitionError);
        }

        errors
    }

    fn check_calories(
        &self,
        answer: &str,
        question: &str,
        expected: Option<&str>,
        errors: &mut Vec<ErrorTag>,
    ) {
        let Some((value, _)) = find_calories(answer) else {
            errors.push(ErrorTag::MissingCalorieInfo);
            return;
        };

        if !self.calories.in_bound(value, question) {
            errors.push(ErrorTag::CalorieRangeError);
        }

        if let Some((reference, _)) = expected.and_then(find_calories) {
            if relative_difference(value, reference) > self.tolerances.calories {
                errors.push(ErrorTag::CalorieMismatchError);
            }
        }
    }

    fn check_rating(&self, answer: &str, expected: Option<&str>, errors: &mut Vec<ErrorTag>) {
        let (Some(rating), Some(reference)) =
            (find_rating(answer), expected.and_then(find_rating))
        else {
            return;
        };

        if (rating - reference).abs() > self.tolerances.rating {
            errors.push(ErrorTag::RatingMismatchError);
        }
    }

    fn check_duration(&self, answer: &str, expected: Option<&str>, errors: &mut Vec<ErrorTag>) {
        let (Some(figure), Some(reference)) =
            (find_duration(answer), expected.and_then(find_duration))
        else {
            return;
        };

        // Figures in different units are not comparable.
        if figure.unit != reference.unit {
            return;
        }

        let diff = relative_difference(figure.value as f64, reference.value as f64);
        if diff > self.tolerances.duration {
            errors.push(ErrorTag::TimeMismatchError);
        }
    }
}

/// Relative error `|a - b| / b`. A zero reference yields infinity, which any
/// finite tolerance flags.
fn relative_difference(value: f64, reference: f64) -> f64 {
    (value - reference).abs() / reference
}

/// Whether any token exactly repeats its predecessor. Input is expected to be
/// lower-cased already; the scan stops at the first repeat.
fn has_adjacent_repeat(text: &str) -> bool {
    let mut tokens = text.split_whitespace();
    let Some(mut prev) = tokens.next() else {
        return false;
    };
    for token in tokens {
        if token == prev {
            return true;
        }
        prev = token;
    }
    false
}
