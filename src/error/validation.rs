use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Invalid number: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Step sequence must not be empty.")]
    StepSequenceEmpty,
    #[error("Invalid step '{value}' in step sequence: {source}")]
    InvalidStep {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Steps must be >= 1 (got '{value}').")]
    StepNotPositive { value: String },
    #[error("Step sequence must go from coarse to fine (got {previous} then {next}).")]
    StepSequenceNotDescending { previous: u64, next: u64 },
    #[error("Invalid HTTP header '{header}': {source}")]
    InvalidHeaderName {
        header: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("Invalid value for HTTP header '{header}': {source}")]
    InvalidHeaderValue {
        header: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("Failed to build runtime: {source}")]
    RuntimeBuildFailed {
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
