//! Prompt template for the generation collaborator.
//!
//! The model was trained on `question: <text>` pairs; prompts must carry the
//! same instruction tag or decoding quality degrades.

/// Instruction tag prefixed to every question.
pub const INSTRUCTION_TAG: &str = "question: ";

/// Build the bounded prompt for a question.
pub fn build_prompt(question: &str) -> String {
    format!("{}{}", INSTRUCTION_TAG, question.trim())
}
