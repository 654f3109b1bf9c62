//! Shared types for answer validation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed refusal returned for questions outside the recipe domain.
pub const REFUSAL_SENTENCE: &str = "Sorry, I can only answer recipe-related questions. \
     Try asking about cooking, ingredients, ratings, or calories!";

/// Fixed fallback returned when a normalized answer carries too little content.
pub const FALLBACK_SENTENCE: &str = "Please provide more details about the recipe question.";

/// Fixed answer returned when raw generator output fails the charset gate.
pub const NON_ENGLISH_SENTENCE: &str = "Error: Non-English output detected.";

/// Fixed answer returned when the generator itself fails.
///
/// Deliberately generic: the underlying error text goes to the diagnostic
/// log, never to the caller.
pub const GENERATION_FAILURE_SENTENCE: &str =
    "Error: failed to generate an answer. Please try again.";

/// A heuristic label flagging a suspected inconsistency in a generated answer.
///
/// Tags are advisory findings, not proofs of incorrectness. Detection returns
/// them in check order; each check appends its tag at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorTag {
    /// Answer is a refusal or error sentence, not a recipe answer.
    NonRecipeOrError,
    /// Contradictory cooking method ("fry in water").
    CookingMethodError,
    /// Absurd duration claim ("cook for days").
    TimeError,
    /// Zero or negative servings claim.
    ServingsError,
    /// Ingredient/category conflict ("salt in dessert").
    IngredientError,
    /// Calorie figure outside the plausible bound for the dish category.
    CalorieRangeError,
    /// Calorie figure too far from the reference answer's figure.
    CalorieMismatchError,
    /// Question asks about calories but the answer has no calorie figure.
    MissingCalorieInfo,
    /// Rating too far from the reference answer's rating.
    RatingMismatchError,
    /// Duration too far from the reference answer's duration.
    TimeMismatchError,
    /// Answer repeats a token back to back.
    RepetitionError,
}

impl ErrorTag {
    /// Wire-stable snake_case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::NonRecipeOrError => "non_recipe_or_error",
            ErrorTag::CookingMethodError => "cooking_method_error",
            ErrorTag::TimeError => "time_error",
            ErrorTag::ServingsError => "servings_error",
            ErrorTag::IngredientError => "ingredient_error",
            ErrorTag::CalorieRangeError => "calorie_range_error",
            ErrorTag::CalorieMismatchError => "calorie_mismatch_error",
            ErrorTag::MissingCalorieInfo => "missing_calorie_info",
            ErrorTag::RatingMismatchError => "rating_mismatch_error",
            ErrorTag::TimeMismatchError => "time_mismatch_error",
            ErrorTag::RepetitionError => "repetition_error",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a question was refused admission to the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Question contains characters outside the allowed set.
    InvalidCharset,
    /// Question is well-formed but matches no domain keyword or template.
    OffTopic,
}

/// Result of domain classification.
///
/// Classification itself is pure; callers that want the rejection logged
/// (the pipeline does) act on the returned reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}
