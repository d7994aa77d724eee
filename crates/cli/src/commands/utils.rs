use mpic_core::{config::AppConfig, coordinator::BuildError};
use std::{fmt, path::Path};

#[derive(Debug)]
pub enum CliError {
    Config(String),
    Io(String),
    Build(String),
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Build(msg) => write!(f, "Startup error: {msg}"),
            Self::General(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::General(error.to_string())
    }
}

impl From<BuildError> for CliError {
    fn from(error: BuildError) -> Self {
        Self::Build(error.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration file, failing if it does not exist.
pub fn load_config(file: &Path) -> CliResult<AppConfig> {
    if !file.exists() {
        return Err(CliError::Config(format!("File not found: {}", file.display())));
    }
    AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))
}

pub fn print_success(message: &str) {
    eprintln!("[SUCCESS] {message}");
}

pub fn print_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn print_info(message: &str) {
    eprintln!("[INFO] {message}");
}
