//! Rule-set parsing and validation.
//!
//! The correction tables, error-pattern lists, calorie bounds, and tolerances
//! are structured data: built once, passed into the normalizer/detector
//! constructors, and optionally overridden from a YAML/JSON file validated
//! against a JSON Schema.

mod parser;
mod schema;

pub use parser::{
    CalorieRule, CalorieTable, LexicalFix, PhraseCategory, RuleSet, RulesError, Tolerances,
};
pub use schema::validate_ruleset_schema;
