//! EVIDENTIA command line.
//!
//! Reconciles an automated test's plan against what the recordings show and
//! reports every step as observed or as a deviation.
//!
//! Usage:
//!   evidentia reconcile --plan agent_inner_logs.json --evidence bundle.json
//!   evidentia reconcile --plan log.json --evidence bundle.json --format html --output report.html
//!   evidentia reconcile --plan log.json --evidence bundle.json --test-result test_result.xml
//!   evidentia sample --format json
//!   evidentia verify-audit --log audit.json

mod pipeline;
mod sample;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use evidentia_audit::{find_break, verify_log, AuditLog};
use evidentia_contracts::error::{EvidentiaError, EvidentiaResult};
use evidentia_core::ReconcileInput;
use evidentia_report::{render, save_report, ReportFormat};

use pipeline::{reconcile, RunOutcome};

// ── CLI definition ────────────────────────────────────────────────────────────

/// EVIDENTIA: step-to-evidence reconciliation for automated test runs.
#[derive(Parser)]
#[command(
    name = "evidentia",
    about = "Reconcile a test plan against recorded evidence",
    long_about = "Matches each planned test step to the actions observed in screen\n\
                  recordings, classifies deviations, and cross-references them\n\
                  with the test harness output."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile a planner log against an evidence bundle.
    Reconcile {
        /// Planner-agent JSON log.
        #[arg(long)]
        plan: PathBuf,
        /// Evidence bundle JSON (observed actions and test results).
        #[arg(long)]
        evidence: PathBuf,
        /// Test harness output (JUnit `.xml` or pytest-html `.html`).
        #[arg(long)]
        test_result: Option<PathBuf>,
        /// Threshold overrides (TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write the sealed audit log (JSON) here.
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },
    /// Run the built-in four-step sample scenario.
    Sample {
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
    /// Check the hash chain of a saved audit log.
    VerifyAudit {
        #[arg(long)]
        log: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Html,
    Json,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-step decisions.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Reconcile {
            plan,
            evidence,
            test_result,
            config,
            format,
            output,
            audit_log,
        } => run_reconcile(
            &plan,
            &evidence,
            test_result.as_deref(),
            config.as_deref(),
            format,
            output.as_deref(),
            audit_log.as_deref(),
        ),
        Command::Sample { format } => run_sample(format),
        Command::VerifyAudit { log } => run_verify_audit(&log),
    };

    if let Err(e) = result {
        eprintln!("evidentia error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_reconcile(
    plan_path: &Path,
    evidence_path: &Path,
    test_result_path: Option<&Path>,
    config_path: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
    audit_path: Option<&Path>,
) -> EvidentiaResult<()> {
    let config = evidentia_config::load_or_default(config_path)?;
    let plan = evidentia_ingest::parse_plan_log_from_file(plan_path)?;
    let bundle = evidentia_ingest::load_bundle_from_file(evidence_path)?;

    // The planner's own assertion verdicts count as test evidence too.
    let mut evidence = bundle.evidence;
    evidence.assertions.extend(plan.assertions);

    let mut steps = plan.steps;
    if let Some(path) = test_result_path {
        let report = evidentia_ingest::parse_test_result_from_file(path)?;
        if steps.is_empty() && !report.steps.is_empty() {
            warn!(
                path = %path.display(),
                steps = report.steps.len(),
                "planner log has no steps; using the steps recorded in the test result"
            );
            steps = report.steps;
        }
        evidence.absorb(report.evidence);
    }

    let input = ReconcileInput {
        steps,
        sources: bundle.sources,
        evidence,
    };
    info!(
        plan = %plan_path.display(),
        evidence = %evidence_path.display(),
        steps = input.steps.len(),
        "inputs loaded"
    );

    let outcome = reconcile(&input, config)?;
    emit(&outcome, format, output)?;

    if let Some(path) = audit_path {
        let json = to_json(&outcome.audit)?;
        save_report(&json, path)?;
    }
    Ok(())
}

fn run_sample(format: OutputFormat) -> EvidentiaResult<()> {
    let outcome = reconcile(&sample::input(), Default::default())?;
    emit(&outcome, format, None)
}

fn run_verify_audit(path: &Path) -> EvidentiaResult<()> {
    let contents = std::fs::read_to_string(path).map_err(|e| EvidentiaError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let log: AuditLog = serde_json::from_str(&contents).map_err(|e| EvidentiaError::InvalidInput {
        reason: format!("audit log is not valid JSON: {}", e),
    })?;

    if verify_log(&log) {
        println!(
            "audit log OK: run {}, {} decisions, terminal hash {}",
            log.run_id,
            log.events.len(),
            log.terminal_hash
        );
        return Ok(());
    }

    let detail = match find_break(&log.events) {
        Some(brk) => format!("{:?}", brk),
        None => "terminal hash or run id does not match the events".to_string(),
    };
    Err(EvidentiaError::AuditWriteFailed {
        reason: format!("audit log '{}' failed verification: {}", path.display(), detail),
    })
}

// ── Output ────────────────────────────────────────────────────────────────────

fn emit(outcome: &RunOutcome, format: OutputFormat, output: Option<&Path>) -> EvidentiaResult<()> {
    let content = match format {
        OutputFormat::Json => to_json(&outcome.summary)?,
        OutputFormat::Markdown => render(&outcome.summary, ReportFormat::Markdown, chrono::Utc::now())?,
        OutputFormat::Html => render(&outcome.summary, ReportFormat::Html, chrono::Utc::now())?,
    };

    match output {
        Some(path) => save_report(&content, path)?,
        None => println!("{content}"),
    }

    eprintln!(
        "audit: run {}, {} decisions, terminal hash {}",
        outcome.audit.run_id,
        outcome.audit.events.len(),
        if outcome.audit.terminal_hash.is_empty() {
            "(empty)"
        } else {
            outcome.audit.terminal_hash.as_str()
        }
    );
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> EvidentiaResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| EvidentiaError::ReportFailed {
        reason: format!("failed to serialize JSON output: {}", e),
    })
}
