//! Major Advisor binary entry point.
//!
//! Runs a new session from a profile JSON file, or resumes a stored one, and
//! prints the final report. Logs go to stderr; the report goes to stdout.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use major_advisor::anthropic::{AnthropicClient, ClientConfig};
use major_advisor::config::Config;
use major_advisor::error::{AppError, InputError};
use major_advisor::model::UserProfile;
use major_advisor::storage::SqliteStorage;
use major_advisor::workflow::{build_report, render_markdown, WorkflowEngine};

#[derive(Parser)]
#[command(name = "major-advisor")]
#[command(about = "Recommend an academic major through persona debates, AHP and TOPSIS", long_about = None)]
#[command(version)]
struct Cli {
    /// Profile JSON file for a new session
    #[arg(required_unless_present = "resume", conflicts_with = "resume")]
    profile: Option<PathBuf>,

    /// Resume a stored session by id
    #[arg(short, long)]
    resume: Option<String>,

    /// Print the report as JSON instead of markdown
    #[arg(long)]
    json: bool,
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            config
                .log_level
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "major-advisor failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(cli: Cli, config: Config) -> Result<(), AppError> {
    tracing::info!(
        database = %config.database_path,
        model = %config.model,
        timeout_ms = config.request_timeout_ms,
        "Configuration loaded"
    );

    let store = Arc::new(SqliteStorage::new(&config.database_path).await?);
    let client_config = ClientConfig::default()
        .with_model(config.model.clone())
        .with_timeout_ms(config.request_timeout_ms);
    let oracle = Arc::new(AnthropicClient::new(config.api_key.clone(), client_config)?);
    let engine = WorkflowEngine::new(oracle, store, config.pipeline_policy());

    let state = match (cli.resume, cli.profile) {
        (Some(session_id), _) => engine.resume(&session_id).await?,
        (None, Some(path)) => {
            let profile = read_profile(&path).await?;
            engine.run(profile).await?
        }
        (None, None) => {
            return Err(InputError::Malformed {
                message: "a profile file or --resume is required".into(),
            }
            .into())
        }
    };

    let Some(report) = build_report(&state) else {
        return Err(InputError::Malformed {
            message: format!("session {} has no ranking", state.id),
        }
        .into());
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).map_err(|e| InputError::Malformed {
            message: e.to_string(),
        })?;
        println!("{json}");
    } else {
        println!("{}", render_markdown(&report));
    }
    tracing::info!(session_id = %state.id, "Session complete");
    Ok(())
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn read_profile(path: &Path) -> Result<UserProfile, InputError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InputError::Malformed {
            message: format!("{}: {e}", path.display()),
        })?;
    let profile: UserProfile = serde_json::from_str(&text).map_err(|e| InputError::Malformed {
        message: e.to_string(),
    })?;
    profile.validate()?;
    Ok(profile)
}
