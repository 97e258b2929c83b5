use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for the CLI
///
/// # Console
/// - stderr, so command output on stdout stays clean
/// - disabled when `quiet` is set
///
/// # File
/// - appended to `log_file` when given, without ANSI colors
/// - both sinks are active when a file is given and `quiet` is not set
pub fn init_logging(quiet: bool, log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match (quiet, log_file) {
        (true, None) => {
            // No sink requested: leave tracing without a subscriber
        }
        (true, Some(path)) => init_file_logging(path)?,
        (false, Some(path)) => init_dual_logging(path)?,
        (false, None) => init_console_logging()?,
    }
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
}

/// Console-only logging (stderr)
fn init_console_logging() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// File-only logging
fn init_file_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = open_log_file(path)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .try_init()?;
    Ok(())
}

/// Dual logging: both console (stderr) and file
fn init_dual_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = open_log_file(path)?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .try_init()?;
    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
