//! CLI for the colander answer validation pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use colander_core::{validate_ruleset_schema, RuleSet};
use colander_runtime::{
    AnswerPipeline, CannedGenerator, DetailedReply, DiagnosticLog, Generator, SimpleReply,
};

#[derive(Parser)]
#[command(name = "colander", version, about = "Validate and sanitize recipe-QA answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question through the full pipeline
    Ask {
        /// The question to answer
        question: String,

        /// Return the detailed reply (raw answer, factual errors, timing)
        #[arg(long)]
        details: bool,

        /// Reference answer for mismatch checks (implies --details)
        #[arg(long)]
        expected: Option<String>,

        /// Rule-set override file (YAML)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Diagnostic log location
        #[arg(long, default_value = "logs/diagnostics.log")]
        log: PathBuf,

        /// Inference-server URL (requires the `http` feature)
        #[arg(long, conflicts_with = "canned")]
        endpoint: Option<String>,

        /// Fixed generator output, for offline runs of the validation pipeline
        #[arg(long)]
        canned: Option<String>,
    },

    /// Validate a rule-set file against the schema
    Rules {
        /// Rule-set file to check (YAML)
        #[arg(long)]
        check: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Ask {
            question,
            details,
            expected,
            rules,
            log,
            endpoint,
            canned,
        } => {
            ask(
                &question,
                details || expected.is_some(),
                expected.as_deref(),
                rules,
                log,
                endpoint,
                canned,
            )
            .await
        }
        Commands::Rules { check } => check_rules(&check),
    }
}

#[allow(clippy::too_many_arguments)]
async fn ask(
    question: &str,
    details: bool,
    expected: Option<&str>,
    rules: Option<PathBuf>,
    log: PathBuf,
    endpoint: Option<String>,
    canned: Option<String>,
) -> Result<()> {
    let rules = match rules {
        Some(path) => {
            let rules = RuleSet::from_yaml_file(&path)
                .with_context(|| format!("loading rule set from {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded rule-set override");
            rules
        }
        None => RuleSet::default(),
    };

    let generator = build_generator(endpoint, canned)?;

    let pipeline = AnswerPipeline::builder()
        .generator(generator)
        .rules(rules)
        .log(DiagnosticLog::open(log))
        .build()?;

    if details {
        let report = pipeline.answer_detailed(question, expected).await;
        println!(
            "{}",
            serde_json::to_string_pretty(&DetailedReply::from(report))?
        );
    } else {
        let report = pipeline.answer(question).await;
        println!(
            "{}",
            serde_json::to_string_pretty(&SimpleReply::from(report))?
        );
    }

    Ok(())
}

#[cfg(feature = "http")]
fn endpoint_generator(endpoint: String) -> Result<Arc<dyn Generator>> {
    Ok(Arc::new(colander_runtime::HttpGenerator::new(endpoint)))
}

#[cfg(not(feature = "http"))]
fn endpoint_generator(_endpoint: String) -> Result<Arc<dyn Generator>> {
    bail!("this build has no HTTP generator; rebuild with `--features http`")
}

fn build_generator(
    endpoint: Option<String>,
    canned: Option<String>,
) -> Result<Arc<dyn Generator>> {
    match (endpoint, canned) {
        (Some(endpoint), _) => endpoint_generator(endpoint),
        (None, Some(text)) => Ok(Arc::new(CannedGenerator::new(text))),
        (None, None) => bail!("provide --endpoint <URL> or --canned <TEXT>"),
    }
}

fn check_rules(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    // Schema first for precise error locations, then the structural pass.
    let value: serde_json::Value =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;

    if let Err(errors) = validate_ruleset_schema(&value) {
        for error in &errors {
            eprintln!("schema error: {}", error);
        }
        bail!("{} failed schema validation", path.display());
    }

    let rules = RuleSet::from_yaml(&contents)
        .with_context(|| format!("validating {}", path.display()))?;

    println!(
        "{} OK: {} corrections, {} error-pattern categories, {} calorie rules",
        path.display(),
        rules.corrections.len(),
        rules.error_patterns.len(),
        rules.calories.rules.len()
    );
    Ok(())
}
