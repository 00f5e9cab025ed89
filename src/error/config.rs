use super::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Invalid header: {source}")]
    InvalidHeader {
        #[source]
        source: ValidationError,
    },
    #[error("Config '{field}' is invalid: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("Concurrency limit must be >= 1.")]
    ConcurrencyZero,
    #[error("Time budget must be > 0.")]
    TimeBudgetZero,
    #[error("Request timeout must be > 0.")]
    RequestTimeoutZero,
    #[error("Invalid step sequence: {source}")]
    InvalidSteps {
        #[source]
        source: ValidationError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
