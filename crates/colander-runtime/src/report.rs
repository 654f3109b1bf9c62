//! Result shapes returned by the answer pipeline.
//!
//! [`AnswerReport`] is the internal result; the two reply structs are the
//! wire shapes an external transport layer serializes, with field names kept
//! stable for existing consumers.

use colander_core::ErrorTag;
use serde::Serialize;

/// Structured result of one pipeline invocation.
///
/// Always well-formed: every pipeline path - refusal, generation failure,
/// anomaly, success - terminates in one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerReport {
    /// Final user-facing answer (possibly a fixed refusal/error sentence).
    pub answer: String,

    /// Raw generator output, absent when no generation happened.
    pub raw_answer: Option<String>,

    /// Wall-clock seconds spent inside the generator call only.
    pub generation_secs: f64,

    /// Advisory factual-error tags (empty for simple queries).
    pub errors: Vec<ErrorTag>,
}

impl AnswerReport {
    /// Report for a path that never reached the generator.
    pub fn without_generation(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            raw_answer: None,
            generation_secs: 0.0,
            errors: Vec::new(),
        }
    }
}

/// Reply shape for a simple query.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleReply {
    pub answer: String,
    pub status: String,
}

impl From<AnswerReport> for SimpleReply {
    fn from(report: AnswerReport) -> Self {
        Self {
            answer: report.answer,
            status: "success".to_string(),
        }
    }
}

/// Reply shape for a detailed query.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedReply {
    pub answer: String,
    pub raw_answer: Option<String>,
    pub factual_errors: Vec<ErrorTag>,
    pub generation_time: f64,
    pub status: String,
}

impl From<AnswerReport> for DetailedReply {
    fn from(report: AnswerReport) -> Self {
        Self {
            answer: report.answer,
            raw_answer: report.raw_answer,
            factual_errors: report.errors,
            generation_time: report.generation_secs,
            status: "success".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_reply_wire_shape() {
        let report = AnswerReport {
            answer: "Simmer for 45 minutes.".to_string(),
            raw_answer: Some("raw".to_string()),
            generation_secs: 0.42,
            errors: vec![],
        };

        let json = serde_json::to_value(SimpleReply::from(report)).unwrap();
        assert_eq!(json["answer"], "Simmer for 45 minutes.");
        assert_eq!(json["status"], "success");
        assert!(json.get("raw_answer").is_none());
    }

    #[test]
    fn test_detailed_reply_wire_shape() {
        let report = AnswerReport {
            answer: "The soup has a specific calorie count.".to_string(),
            raw_answer: Some("The soup has 900 calories.".to_string()),
            generation_secs: 1.25,
            errors: vec![ErrorTag::MissingCalorieInfo],
        };

        let json = serde_json::to_value(DetailedReply::from(report)).unwrap();
        assert_eq!(json["raw_answer"], "The soup has 900 calories.");
        assert_eq!(json["factual_errors"][0], "missing_calorie_info");
        assert_eq!(json["generation_time"], 1.25);
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn test_without_generation() {
        let report = AnswerReport::without_generation("Sorry, off-topic.");
        assert!(report.raw_answer.is_none());
        assert_eq!(report.generation_secs, 0.0);
        assert!(report.errors.is_empty());
    }
}
