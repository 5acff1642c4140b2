//! `procdbg-replay`: print a recorded suspension as DAP stack trace and
//! variables responses.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::filter::Directive;

use procdbg::replay::replay;
use procdbg::{SessionConfig, Transcript};

#[derive(Debug, Parser)]
#[command(
    name = "procdbg-replay",
    version,
    about = "Replay a recorded procedure suspension as DAP responses"
)]
struct Cli {
    /// Transcript with the suspended call stack and its variables (JSON).
    transcript: PathBuf,
    /// Session configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("procdbg-replay error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match cli.config.as_ref() {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    init_tracing(config.log_filter.as_deref())?;

    let transcript = Transcript::load(&cli.transcript)
        .with_context(|| format!("loading {}", cli.transcript.display()))?;
    info!(
        frames = transcript.frames.len(),
        variables = transcript.variables.len(),
        "replaying suspension"
    );
    let output = replay(transcript, config)?;
    if let Some(err) = output.fetch_error.as_ref() {
        warn!(error = %err, "innermost frame variables unavailable");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", serde_json::to_string_pretty(&output.stack_trace)?)?;
    if let Some(scopes) = output.scopes.as_ref() {
        writeln!(out, "{}", serde_json::to_string_pretty(scopes)?)?;
    }
    if let Some(variables) = output.variables.as_ref() {
        writeln!(out, "{}", serde_json::to_string_pretty(variables)?)?;
    }
    Ok(())
}

fn init_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    if let Some(filter) = filter {
        let directive = filter
            .parse::<Directive>()
            .with_context(|| format!("log filter '{filter}'"))?;
        env_filter = env_filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
