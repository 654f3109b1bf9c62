//! # colander-runtime
//!
//! Generation runtime and answer pipeline for colander.
//!
//! `colander-core` is fully deterministic and never talks to a model. This
//! crate adds the side-effectful half:
//! - the [`Generator`] capability trait and its HTTP implementation
//!   (feature `http`)
//! - the append-only [`DiagnosticLog`]
//! - the [`AnswerPipeline`] that composes admission, generation,
//!   normalization, and detection into one never-failing call
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use colander_runtime::{AnswerPipeline, DiagnosticLog, HttpGenerator};
//!
//! let pipeline = AnswerPipeline::builder()
//!     .generator(Arc::new(HttpGenerator::from_env()?))
//!     .log(DiagnosticLog::open("logs/diagnostics.log"))
//!     .build()?;
//!
//! let report = pipeline.answer("How long does chicken soup take to cook?").await;
//! println!("{}", report.answer);
//! ```

pub mod diagnostics;
pub mod generator;
pub mod pipeline;
pub mod prompts;
pub mod report;

// Re-export main types at crate root
pub use diagnostics::{DiagnosticLog, LogCategory};
pub use generator::{CannedGenerator, GenerationParams, Generator, GeneratorError};
pub use pipeline::{AnswerPipeline, AnswerPipelineBuilder, PipelineError};
pub use prompts::{build_prompt, INSTRUCTION_TAG};
pub use report::{AnswerReport, DetailedReply, SimpleReply};

#[cfg(feature = "http")]
pub use generator::HttpGenerator;
