//! certwatch - SSL/TLS certificate expiry warnings
//!
//! Checks one certificate file and, when it is expired, not yet valid or
//! close to expiry, prints a mail-formatted warning on stdout.
//!
//! Exit status is inverted on purpose: 0 means a warning condition exists,
//! 1 means no warning (healthy, unreadable or skipped certificate, or no
//! certificate given at all) and 2 is any other usage error.

use anyhow::{Context, Result};
use certwatch_config::WatchConfig;
use certwatch_crypto::check_certificate;
use chrono::{DateTime, Utc};
use clap::error::ErrorKind;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error};

mod telemetry;

const NO_WARNING: u8 = 1;
const USAGE_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "certwatch")]
#[command(about = "Generate SSL/TLS certificate expiry warnings", long_about = None)]
struct Cli {
    /// Enable quiet mode: report through the exit status only
    #[arg(short, long)]
    quiet: bool,

    /// Number of days before expiry to start warning [default: 30]
    #[arg(short, long, value_name = "DAYS")]
    period: Option<u32>,

    /// Recipient address [default: root]
    #[arg(short, long, value_name = "ADDR")]
    address: Option<String>,

    /// YAML file with default settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// PEM certificate to check
    certificate: PathBuf,
}

fn main() -> ExitCode {
    if let Err(e) = telemetry::init_logging() {
        eprintln!("certwatch: logging unavailable: {}", e);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if let Err(print_err) = e.print() {
                error!(error = %print_err, "Failed to print usage");
            }
            return ExitCode::from(usage_status(&e));
        }
    };

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Invalid configuration");
            return ExitCode::from(USAGE_ERROR);
        }
    };

    let now = Utc::now();
    let stdout = io::stdout();
    match run(&cli.certificate, &config, now, &mut stdout.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Failed to write warning");
            ExitCode::FAILURE
        }
    }
}

/// Exit status for a command-line parse failure.
///
/// A missing certificate argument counts as "no warning", the same as a
/// certificate that cannot be read. Help and version keep clap's 0.
fn usage_status(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::MissingRequiredArgument => NO_WARNING,
        _ => u8::try_from(err.exit_code()).unwrap_or(USAGE_ERROR),
    }
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<WatchConfig> {
    let base = match &cli.config {
        Some(path) => WatchConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => WatchConfig::default(),
    };
    Ok(base.with_overrides(cli.period, cli.address.clone(), cli.quiet))
}

/// Check one certificate and write its notice, if any, to `out`.
///
/// Returns whether a warning condition exists. Certificates that cannot be
/// loaded or are skipped count as no warning.
fn run(
    path: &Path,
    config: &WatchConfig,
    now: DateTime<Utc>,
    out: &mut impl Write,
) -> io::Result<bool> {
    let decision = match check_certificate(path, config, now) {
        Ok(decision) => decision,
        Err(e) => {
            debug!(error = %e, "No decision for certificate");
            return Ok(false);
        }
    };

    if let Some(message) = &decision.message {
        out.write_all(message.as_bytes())?;
        out.flush()?;
    }
    Ok(decision.should_warn())
}
