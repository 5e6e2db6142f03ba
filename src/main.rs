//! digest-tool - digest a batch of files and reconcile them against a digest ledger.
//!
//! Usage:
//!   digest-tool <ALGORITHM> <LEDGER> <FILE>...
//!   digest-tool --list

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use digest_tool::config::{RunConfig, RunOptions, Settings};
use digest_tool::hash::path_utils::ledger_display_name;
use digest_tool::hash::{
    run, Algorithm, DigestToolError, LedgerContent, PairScope, ReportFormat, ReportStyle,
};

#[derive(Parser)]
#[command(
    name = "digest-tool",
    version,
    about = "Digest files and reconcile them against a digest ledger",
    long_about = "Computes a digest for every FILE, reports files whose digests collide, \
                  and checks the rest against the LEDGER: NOT FOUND (now recorded), \
                  OK, NOT OK (content changed) or COLLISION (another file has this digest)."
)]
struct Cli {
    /// Hash algorithm (e.g. MD5, SHA1, SHA-256)
    #[arg(required_unless_present = "list")]
    algorithm: Option<String>,

    /// Digest ledger file
    #[arg(required_unless_present = "list")]
    ledger: Option<PathBuf>,

    /// Files to digest
    #[arg(required_unless_present = "list")]
    files: Vec<PathBuf>,

    /// List supported algorithms and exit
    #[arg(long)]
    list: bool,

    /// Settings file (default: <config dir>/digest-tool/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// Spell the collision status COLISION, like older reports
    #[arg(long)]
    legacy_labels: bool,

    /// Only consult the first two digests of each ledger record
    #[arg(long)]
    two_slot: bool,

    /// Treat a missing ledger as empty and create it
    #[arg(long)]
    create: bool,

    /// Digest files one at a time
    #[arg(long)]
    sequential: bool,

    /// Show a progress bar while digesting
    #[arg(long)]
    progress: bool,

    /// Print the ledger content before and after the run (a `ledger` object in JSON)
    #[arg(long)]
    show_ledger: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let usage = err
                .downcast_ref::<DigestToolError>()
                .is_some_and(DigestToolError::is_usage_error);
            ExitCode::from(if usage { 2 } else { 1 })
        }
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the given level.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_cli(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(cli.config.as_deref())?;
    setup_tracing(if cli.verbose { "debug" } else { settings.log.level.as_str() });

    if cli.list {
        print_algorithms();
        return Ok(ExitCode::SUCCESS);
    }

    let (Some(algorithm), Some(ledger)) = (cli.algorithm, cli.ledger) else {
        return Err(DigestToolError::InvalidArguments {
            message: "algorithm, ledger and at least one file are required".to_string(),
        }
        .into());
    };

    let mut options = RunOptions::from_settings(&settings);
    if cli.two_slot {
        options.pair_scope = PairScope::FirstTwo;
    }
    options.create_missing |= cli.create;
    options.parallel &= !cli.sequential;
    options.progress = cli.progress && std::io::stderr().is_terminal();

    let config = RunConfig::new(&algorithm, ledger, cli.files, options)?;
    let outcome = run(&config)
        .with_context(|| format!("digest run against {} failed", config.ledger_path.display()))?;

    let color = settings.report.color && !cli.no_color && std::io::stdout().is_terminal();
    colored::control::set_override(color);
    let style = ReportStyle {
        legacy_collision_label: cli.legacy_labels || settings.report.legacy_collision_label,
        color,
    };

    match cli.format.unwrap_or(settings.report.format) {
        ReportFormat::Json => {
            let ledger = cli.show_ledger.then(|| LedgerContent {
                before: &outcome.ledger_before,
                after: &outcome.ledger_after,
            });
            println!("{}", outcome.report.to_json(style, ledger)?);
        }
        ReportFormat::Text => {
            if cli.show_ledger {
                let name = ledger_display_name(&config.ledger_path);
                println!("{}'s content before:\n{}", name, outcome.ledger_before);
                println!("{}'s content after:\n{}", name, outcome.ledger_after);
                println!("Results:");
            }
            print!("{}", outcome.report.to_plain_text(style));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_algorithms() {
    println!("Supported algorithms:");
    for info in Algorithm::list() {
        if info.aliases.is_empty() {
            println!("  {:<12} {:>4} bits", info.name, info.output_bits);
        } else {
            println!(
                "  {:<12} {:>4} bits  (also: {})",
                info.name,
                info.output_bits,
                info.aliases.join(", ")
            );
        }
    }
}
