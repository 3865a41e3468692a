//! Headless state-engine driver.
//!
//! Feeds decoded engine messages, one JSON object per line, to the state
//! engine and prints what changed after each one.
//!
//! # Usage
//!
//! ```bash
//! # Read messages from stdin
//! cargo run -p tc_headless < session.jsonl
//!
//! # Micro battles with marines and zerglings considered
//! cargo run -p tc_headless -- --micro --consider Terran_Marine --consider 37 --input session.jsonl
//! ```
//!
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): controlled by `RUST_LOG`, `--verbose` lowers the default to debug

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tc_headless::{HeadlessConfig, HeadlessRunner};

#[derive(Parser)]
#[command(name = "tc_headless")]
#[command(about = "Feed decoded game messages to the state engine")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// RON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Detect micro-battle boundaries
    #[arg(long)]
    micro: bool,

    /// Unit type to consider, by name or id (repeatable)
    #[arg(long = "consider", value_name = "TYPE")]
    consider: Vec<String>,

    /// Message log to read instead of stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Stop at the first malformed line
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is for protocol
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let mut config =
        match HeadlessConfig::from_options(cli.config.as_deref(), cli.micro, &cli.consider) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Invalid configuration: {e}");
                return ExitCode::FAILURE;
            }
        };
    config.strict = cli.strict;

    let mut runner = HeadlessRunner::with_config(config);
    let stdout = io::stdout().lock();
    let result = match cli.input {
        Some(path) => match File::open(&path) {
            Ok(file) => runner.run(BufReader::new(file), stdout),
            Err(e) => {
                tracing::error!(path = %path.display(), "Cannot open input: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => runner.run(io::stdin().lock(), stdout),
    };

    match result {
        Ok(stats) if stats.errors == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            tracing::error!("Session aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
