use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use creator_avatar_sync::{
    build_pipeline, init_logging, CreatorOutcome, CreatorSource, CsvCreatorSource, LogFormat,
    LogLevel, LoggingConfig, SettingsFile, SyncConfig,
};

/// Exit status for configuration and input errors
const EXIT_FATAL: u8 = 2;
/// Exit status when `--fail-on-errors` is set and a creator failed
const EXIT_CREATOR_FAILURES: u8 = 1;

/// Download creator avatars, normalize them and publish them to storage
#[derive(Parser)]
#[command(name = "creator-avatar-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// CSV export of the creator spreadsheet
    #[arg(long, short, required_unless_present = "username")]
    input: Option<PathBuf>,

    /// Input column holding the creator username
    #[arg(long)]
    column: Option<String>,

    /// Refresh a single creator instead of reading an input file
    #[arg(long, conflicts_with = "input")]
    username: Option<String>,

    /// Optional TOML settings file
    #[arg(long, env = "AVATAR_SYNC_SETTINGS")]
    settings: Option<PathBuf>,

    /// Bucket receiving the avatars
    #[arg(long)]
    bucket: Option<String>,

    /// Delay between creators, in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Exit with status 1 when any creator failed
    #[arg(long)]
    fail_on_errors: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Log format (pretty, compact, json)
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = LoggingConfig::default()
        .with_format(cli.log_format)
        .with_level(cli.log_level)
        .with_target(false);
    if let Err(e) = init_logging(logging) {
        eprintln!("error: {}", e);
        return ExitCode::from(EXIT_FATAL);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Avatar sync aborted");
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    debug!(storage = ?config.storage, "Configuration loaded");

    let pipeline = build_pipeline(&config).context("failed to create HTTP client")?;

    if let Some(username) = &cli.username {
        let outcome = pipeline.sync_one(username).await?;
        println!("{}", describe(&outcome));

        let failed = matches!(
            outcome,
            CreatorOutcome::AcquireFailed { .. } | CreatorOutcome::StoreFailed { .. }
        );
        return Ok(exit_code(cli.fail_on_errors, failed));
    }

    let input = cli
        .input
        .as_ref()
        .context("an input file is required when --username is not given")?;
    let usernames = CsvCreatorSource::new(input, config.input_column.clone()).usernames()?;

    let report = pipeline.run(&usernames).await;
    println!("{}", report);

    if let Some(path) = &cli.report_json {
        let json = serde_json::to_vec_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    Ok(exit_code(cli.fail_on_errors, report.has_failures()))
}

/// Settings file, then environment, then flags
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut builder = SyncConfig::builder();

    if let Some(path) = &cli.settings {
        builder = builder.apply_settings(SettingsFile::load(path)?);
    }
    builder = builder.apply_env(|key| std::env::var(key).ok());

    if let Some(bucket) = &cli.bucket {
        builder = builder.bucket(bucket.clone());
    }
    if let Some(column) = &cli.column {
        builder = builder.input_column(column.clone());
    }
    if let Some(ms) = cli.pacing_ms {
        builder = builder.pacing_delay(Duration::from_millis(ms));
    }

    builder.build().context("invalid configuration")
}

fn describe(outcome: &CreatorOutcome) -> String {
    match outcome {
        CreatorOutcome::Skipped => "Skipped: blank username".to_string(),
        CreatorOutcome::AcquireFailed { identifier } => {
            format!("{}: no avatar source returned a usable image", identifier)
        }
        CreatorOutcome::StoreFailed { identifier, reason } => {
            format!("{}: upload failed: {}", identifier, reason)
        }
        CreatorOutcome::Updated { identifier, url } => {
            format!("{}: updated -> {}", identifier, url)
        }
        CreatorOutcome::RecordUnmatched {
            identifier,
            url,
            reason,
        } => format!("{}: uploaded to {} but record not updated ({})", identifier, url, reason),
    }
}

fn exit_code(fail_on_errors: bool, failed: bool) -> ExitCode {
    if fail_on_errors && failed {
        ExitCode::from(EXIT_CREATOR_FAILURES)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_input_or_username() {
        assert!(Cli::try_parse_from(["creator-avatar-sync"]).is_err());
        assert!(Cli::try_parse_from(["creator-avatar-sync", "--input", "creators.csv"]).is_ok());
        assert!(Cli::try_parse_from(["creator-avatar-sync", "--username", "alice"]).is_ok());
        assert!(Cli::try_parse_from([
            "creator-avatar-sync",
            "--input",
            "creators.csv",
            "--username",
            "alice"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parses_levels_and_formats() {
        let cli = Cli::try_parse_from([
            "creator-avatar-sync",
            "-i",
            "creators.csv",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--pacing-ms",
            "0",
            "--fail-on-errors",
        ])
        .unwrap();

        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.pacing_ms, Some(0));
        assert!(cli.fail_on_errors);
    }

    #[test]
    fn test_exit_code_policy() {
        assert_eq!(exit_code(false, true), ExitCode::SUCCESS);
        assert_eq!(exit_code(true, false), ExitCode::SUCCESS);
        assert_eq!(exit_code(true, true), ExitCode::from(EXIT_CREATOR_FAILURES));
    }
}
