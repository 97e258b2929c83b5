use std::path::PathBuf;

/// Environment variable overriding the data file location
pub const DATA_FILE_ENV: &str = "ADDRESSBOOK_FILE_PATH";
/// Environment variable enabling file logging
pub const LOG_FILE_ENV: &str = "ADDRESSBOOK_LOG_FILE";

const APP_DIR: &str = "addressbook-rs";
const DEFAULT_FILE_NAME: &str = "addressbook.json";

/// Runtime configuration resolved from CLI flags and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    pub log_file: Option<PathBuf>,
    /// Suppress console logging
    pub quiet: bool,
}

impl Config {
    /// Resolve with the process environment as fallback
    pub fn resolve(data_file: Option<PathBuf>, log_file: Option<PathBuf>, quiet: bool) -> Self {
        Self::resolve_with(
            data_file,
            log_file,
            quiet,
            std::env::var(DATA_FILE_ENV).ok(),
            std::env::var(LOG_FILE_ENV).ok(),
        )
    }

    /// Flag > environment > platform default
    pub fn resolve_with(
        data_file: Option<PathBuf>,
        log_file: Option<PathBuf>,
        quiet: bool,
        data_file_env: Option<String>,
        log_file_env: Option<String>,
    ) -> Self {
        let data_file = data_file
            .or_else(|| non_empty(data_file_env).map(PathBuf::from))
            .unwrap_or_else(default_data_file);
        let log_file = log_file.or_else(|| non_empty(log_file_env).map(PathBuf::from));
        Self {
            data_file,
            log_file,
            quiet,
        }
    }
}

/// `<local data dir>/addressbook-rs/addressbook.json`
pub fn default_data_file() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push(DEFAULT_FILE_NAME);
    path
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
