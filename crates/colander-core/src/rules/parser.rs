//! Rule-set structures and parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::types::ErrorTag;

/// Errors that can occur when loading a rule set.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read rule-set file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rule-set validation failed: {0}")]
    ValidationError(String),
}

/// One known-wrong phrase and its correction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexicalFix {
    /// Phrase to find (case-insensitive substring).
    pub find: String,

    /// Replacement text.
    pub replace: String,
}

/// A detection category: the tag it contributes and the phrases that fire it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhraseCategory {
    /// Tag appended when any phrase in this category matches.
    pub tag: ErrorTag,

    /// Literal phrases, matched case-insensitively against the answer.
    pub phrases: Vec<String>,
}

/// Inclusive calorie bound for one dish-category keyword.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalorieRule {
    /// Dish-category keyword looked for in the question ("soup", "salad", ...).
    pub dish: String,

    /// Inclusive lower bound.
    pub min: f64,

    /// Inclusive upper bound.
    pub max: f64,
}

/// Prioritized dish-category calorie bounds with a fallback default.
///
/// Rules are evaluated first-match-wins against the question text; the
/// default bound applies when no category keyword matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalorieTable {
    /// Category rules in priority order.
    #[serde(default)]
    pub rules: Vec<CalorieRule>,

    /// Fallback lower bound.
    pub default_min: f64,

    /// Fallback upper bound.
    pub default_max: f64,
}

impl CalorieTable {
    /// Bound applicable to a question: first rule whose dish keyword appears
    /// in the lower-cased question wins, else the default bound.
    pub fn bound_for(&self, question: &str) -> (f64, f64) {
        let lowered = question.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(&rule.dish))
            .map(|rule| (rule.min, rule.max))
            .unwrap_or((self.default_min, self.default_max))
    }

    /// Whether a calorie value is inside the bound for a question.
    pub fn in_bound(&self, value: f64, question: &str) -> bool {
        let (min, max) = self.bound_for(question);
        (min..=max).contains(&value)
    }
}

impl Default for CalorieTable {
    fn default() -> Self {
        Self {
            rules: vec![
                CalorieRule { dish: "soup".to_string(), min: 20.0, max: 200.0 },
                CalorieRule { dish: "salad".to_string(), min: 50.0, max: 300.0 },
                CalorieRule { dish: "dessert".to_string(), min: 100.0, max: 500.0 },
                CalorieRule { dish: "main".to_string(), min: 200.0, max: 500.0 },
            ],
            default_min: 10.0,
            default_max: 500.0,
        }
    }
}

/// Tolerances for comparisons against a reference answer.
///
/// Calorie and duration comparisons use relative error `|a - b| / b`; the
/// rating comparison uses absolute difference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tolerances {
    pub calories: f64,
    pub rating: f64,
    pub duration: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            calories: 0.05,
            rating: 0.05,
            duration: 0.20,
        }
    }
}

/// The full rule set consumed by the normalizer and detector.
///
/// Defaults preserve the historical tables; none of the calorie thresholds
/// are treated as nutritional truth, only as backward-compatible bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSet {
    /// Lexical corrections, applied in declaration order.
    #[serde(default = "default_corrections")]
    pub corrections: Vec<LexicalFix>,

    /// Error-pattern categories, scanned in declaration order.
    #[serde(default = "default_error_patterns")]
    pub error_patterns: Vec<PhraseCategory>,

    /// Calorie plausibility bounds.
    #[serde(default)]
    pub calories: CalorieTable,

    /// Reference-comparison tolerances.
    #[serde(default)]
    pub tolerances: Tolerances,
}

fn default_corrections() -> Vec<LexicalFix> {
    let fix = |find: &str, replace: &str| LexicalFix {
        find: find.to_string(),
        replace: replace.to_string(),
    };
    vec![
        fix("bake at 200", "bake at 350"),
        fix("fry in water", "fry in oil"),
        fix("serves 0", "serves a specific number"),
        fix("prep in seconds", "prep in minutes"),
        fix("cook for days", "cook for hours or minutes"),
    ]
}

fn default_error_patterns() -> Vec<PhraseCategory> {
    let category = |tag: ErrorTag, phrases: &[&str]| PhraseCategory {
        tag,
        phrases: phrases.iter().map(|p| p.to_string()).collect(),
    };
    vec![
        category(
            ErrorTag::CookingMethodError,
            &["fry in water", "bake in microwave", "boil in oven"],
        ),
        category(
            ErrorTag::TimeError,
            &["cook for days", "prep in seconds", "bake for years"],
        ),
        category(
            ErrorTag::ServingsError,
            &["serves 0", "yields zero", "serves no one"],
        ),
        category(
            ErrorTag::IngredientError,
            &["sugar in savory", "salt in dessert", "water as main ingredient"],
        ),
    ]
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            corrections: default_corrections(),
            error_patterns: default_error_patterns(),
            calories: CalorieTable::default(),
            tolerances: Tolerances::default(),
        }
    }
}

impl RuleSet {
    /// Parse a rule set from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesError> {
        let rules: RuleSet = serde_yaml::from_str(yaml)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parse a rule set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parse a rule set from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Validate the rule-set structure.
    pub fn validate(&self) -> Result<(), RulesError> {
        for fix in &self.corrections {
            if fix.find.is_empty() {
                return Err(RulesError::ValidationError(
                    "correction with empty 'find' phrase".to_string(),
                ));
            }
        }

        for category in &self.error_patterns {
            if category.phrases.is_empty() {
                return Err(RulesError::ValidationError(format!(
                    "error-pattern category '{}' has no phrases",
                    category.tag
                )));
            }
        }

        let mut bounds: Vec<(&str, f64, f64)> = self
            .calories
            .rules
            .iter()
            .map(|r| (r.dish.as_str(), r.min, r.max))
            .collect();
        bounds.push(("default", self.calories.default_min, self.calories.default_max));
        for (dish, min, max) in bounds {
            if min > max {
                return Err(RulesError::ValidationError(format!(
                    "calorie bound for '{}' has min {} > max {}",
                    dish, min, max
                )));
            }
        }

        for (name, value) in [
            ("calories", self.tolerances.calories),
            ("rating", self.tolerances.rating),
            ("duration", self.tolerances.duration),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(RulesError::ValidationError(format!(
                    "tolerance '{}' must be in (0, 1), got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
