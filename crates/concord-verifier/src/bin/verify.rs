//! Concord Body Verifier CLI
//!
//! Compares an actual body against an expected body and a set of matching
//! rules, printing every mismatch with a diff.
//!
//! Usage:
//!   concord-verify --expected expected.json --actual actual.json [OPTIONS]
//!
//! Exit codes:
//! - 0: the bodies match
//! - 1: mismatches were found
//! - 2: invalid input (unreadable files, bad rules, rules not valid for the
//!   specification version)

use anyhow::Context;
use clap::{Parser, ValueEnum};
use concord_matching::{
    Body, BodyItemMatchResult, BodyMatchResult, ContentMatcherRegistry, ContentType, MatchingContext,
    MatchingRuleCategory, SpecVersion,
};
use concord_verifier::{
    InteractionSummary, LoggingReporter, PactSource, PactSummary, TestResult, TestResultAccumulator, VerifierConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const EXIT_MISMATCH: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Concord Body Verifier - check a body against a contract
#[derive(Parser, Debug)]
#[command(name = "concord-verify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding the expected body
    #[arg(short, long)]
    expected: PathBuf,

    /// File holding the actual body
    #[arg(short, long)]
    actual: PathBuf,

    /// JSON file of matching rules keyed by path expression
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Content type of both bodies
    #[arg(long, default_value = "application/json")]
    content_type: String,

    /// Allow keys in the actual body that the expected body does not have
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    allow_unexpected_keys: Option<bool>,

    /// Specification version the rules are validated against
    #[arg(long)]
    spec_version: Option<SpecVersion>,

    /// YAML verifier configuration
    #[arg(short, long, env = "CONCORD_VERIFIER_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Consumer name used when publishing results
    #[arg(long, default_value = "consumer")]
    consumer: String,

    /// Provider name used when publishing results
    #[arg(long, default_value = "provider")]
    provider: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{RED}Error:{RESET} {e:#}");
            std::process::exit(EXIT_INVALID_INPUT);
        }
    };

    let (expected, actual, rules) = match load_inputs(&args) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("{RED}Error:{RESET} {e:#}");
            std::process::exit(EXIT_INVALID_INPUT);
        }
    };

    let spec_version = config.matching.spec_version;
    let errors = rules.validate_for_version(spec_version);
    if !errors.is_empty() {
        eprintln!("{RED}{BOLD}Invalid matching rules for specification {spec_version}:{RESET}");
        for error in &errors {
            eprintln!("  {RED}✗{RESET} {error}");
        }
        std::process::exit(EXIT_INVALID_INPUT);
    }

    let context = MatchingContext::new(rules, config.matching.allow_unexpected_keys);
    let registry = ContentMatcherRegistry::with_defaults();
    let result = registry.match_body(&expected, &actual, &context);

    match args.format {
        OutputFormat::Text => print_text(&args, &result),
        OutputFormat::Json => match render_json(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{RED}Error:{RESET} {e}");
                std::process::exit(EXIT_INVALID_INPUT);
            }
        },
    }

    if config.publish_results {
        publish(&args, &config, &result);
    }

    if !result.matched() {
        std::process::exit(EXIT_MISMATCH);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<VerifierConfig> {
    let mut config = match &args.config {
        Some(path) => VerifierConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => VerifierConfig::default(),
    };
    config.apply_env()?;

    // Command line wins over file and environment
    if let Some(allow) = args.allow_unexpected_keys {
        config.matching.allow_unexpected_keys = allow;
    }
    if let Some(spec_version) = args.spec_version {
        config.matching.spec_version = spec_version;
    }
    Ok(config)
}

fn read_body(path: &Path, content_type: &ContentType) -> anyhow::Result<Body> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read body from {}", path.display()))?;
    Ok(Body::present(bytes, Some(content_type.clone())))
}

fn load_inputs(args: &Args) -> anyhow::Result<(Body, Body, MatchingRuleCategory)> {
    let content_type: ContentType = args
        .content_type
        .parse()
        .with_context(|| format!("Invalid --content-type '{}'", args.content_type))?;
    let expected = read_body(&args.expected, &content_type)?;
    let actual = read_body(&args.actual, &content_type)?;

    let rules = match &args.rules {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules from {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&contents)
                .with_context(|| format!("Rules file {} is not valid JSON", path.display()))?;
            MatchingRuleCategory::from_json("body", &value)
                .with_context(|| format!("Invalid matching rules in {}", path.display()))?
        }
        None => MatchingRuleCategory::body(),
    };
    Ok((expected, actual, rules))
}

fn print_text(args: &Args, result: &BodyMatchResult) {
    println!("{BOLD}{CYAN}Concord Body Verifier{RESET}");
    println!("{DIM}━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━{RESET}");
    println!("{DIM}Expected:{RESET} {CYAN}{}{RESET}", args.expected.display());
    println!("{DIM}Actual:{RESET}   {CYAN}{}{RESET}\n", args.actual.display());

    if result.matched() {
        println!("{GREEN}{BOLD}✓ Bodies match{RESET}");
        return;
    }

    if let Some(mismatch) = &result.type_mismatch {
        println!("{RED}✗{RESET} {BOLD}{}{RESET}", mismatch.path);
        println!("    {}", mismatch.message);
    }

    for item in result.failures() {
        println!("{RED}✗{RESET} {BOLD}{}{RESET}", item.key);
        for mismatch in &item.result {
            println!("    {}", mismatch.message);
            if args.verbose {
                if let Some(diff) = &mismatch.diff {
                    print_diff(diff);
                }
            }
        }
    }

    println!(
        "\n{RED}{BOLD}{} mismatch(es){RESET} {DIM}across{RESET} {YELLOW}{}{RESET} {DIM}path(s){RESET}",
        result.mismatch_count(),
        result.failures().count() + usize::from(result.type_mismatch.is_some())
    );
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        match line.chars().next() {
            Some('-') => println!("      {RED}{line}{RESET}"),
            Some('+') => println!("      {GREEN}{line}{RESET}"),
            _ => println!("      {DIM}{line}{RESET}"),
        }
    }
}

/// Failed paths as `[{path, mismatches: [...]}]`.
fn render_json(result: &BodyMatchResult) -> serde_json::Result<String> {
    let mut items: Vec<BodyItemMatchResult> = result
        .type_mismatch
        .iter()
        .map(|mismatch| BodyItemMatchResult::new(mismatch.path.clone(), vec![mismatch.clone()]))
        .collect();
    items.extend(result.failures().cloned());
    serde_json::to_string_pretty(&items)
}

fn publish(args: &Args, config: &VerifierConfig, result: &BodyMatchResult) {
    let description = args.expected.display().to_string();
    let interaction = InteractionSummary::new(description.clone()).with_id(description.clone());
    let pact = PactSummary::new(&args.consumer, &args.provider).with_interaction(interaction.clone());
    let accumulator = TestResultAccumulator::new(Arc::new(LoggingReporter), config.clone());

    let test_result = TestResult::from_body_result(&description, result);
    let source = PactSource::File(args.expected.clone());
    if let Err(errors) = accumulator.update_test_result(&pact, &interaction, test_result, &source) {
        eprintln!("{YELLOW}Warning:{RESET} failed to publish verification results");
        for error in errors {
            eprintln!("  {error}");
        }
    }
}
