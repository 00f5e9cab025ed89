use std::path::PathBuf;

use thiserror::Error;

/// Problems with user-provided targets. These never abort a batch: the
/// offending entry is reported and skipped.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Expected '<url> <repeatCount>', got '{content}'.")]
    MissingRepeatCount { content: String },
    #[error("Invalid repeat count '{value}': {source}")]
    InvalidRepeatCount {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Repeat count must be >= 1 (got '{value}').")]
    NonPositiveRepeatCount { value: String },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("URL '{url}' is missing a host.")]
    UrlMissingHost { url: String },
    #[error("URL must not be empty.")]
    EmptyUrl,
    #[error("No runnable targets in '{path}'.")]
    NoTargets { path: PathBuf },
    #[error("Target file '{path}' does not exist.")]
    TargetFileMissing { path: PathBuf },
    #[error("Target file '{path}' already exists.")]
    TargetFileExists { path: PathBuf },
    #[error("Failed to access target file '{path}': {source}")]
    TargetFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
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

impl InputError {
    #[must_use]
    pub const fn at_line(self, line: usize) -> LineError {
        LineError { line, source: self }
    }
}

/// A target-file line that failed to parse.
#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct LineError {
    pub line: usize,
    #[source]
    pub source: InputError,
}
