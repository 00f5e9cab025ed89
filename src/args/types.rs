use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU64, NonZeroUsize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    pub const MIN: Self = Self(NonZeroU64::MIN);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveU64::try_from(value)
    }
}

impl From<PositiveU64> for u64 {
    fn from(value: PositiveU64) -> Self {
        value.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveUsize(NonZeroUsize);

impl PositiveUsize {
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for PositiveUsize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(PositiveUsize)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveUsize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveUsize::try_from(value)
    }
}

impl From<PositiveUsize> for usize {
    fn from(value: PositiveUsize) -> Self {
        value.get()
    }
}

/// Ramp growth increments, ordered coarse to fine (e.g. `100,50,10,5,1`).
///
/// Always holds at least one step and every step is >= 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence(Vec<u64>);

impl StepSequence {
    /// Builds a sequence from raw steps.
    ///
    /// # Errors
    ///
    /// Returns an error when the sequence is empty, contains a zero, or grows
    /// from one step to the next.
    pub fn new(steps: Vec<u64>) -> Result<Self, ValidationError> {
        if steps.is_empty() {
            return Err(ValidationError::StepSequenceEmpty);
        }
        if let Some(zero) = steps.iter().find(|step| **step == 0) {
            return Err(ValidationError::StepNotPositive {
                value: zero.to_string(),
            });
        }
        for pair in steps.windows(2) {
            if let [previous, next] = pair
                && next > previous
            {
                return Err(ValidationError::StepSequenceNotDescending {
                    previous: *previous,
                    next: *next,
                });
            }
        }
        Ok(Self(steps))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    #[must_use]
    pub fn first(&self) -> u64 {
        self.0.first().copied().unwrap_or(1)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<u64> {
        self.0.get(index).copied()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl Default for StepSequence {
    fn default() -> Self {
        Self(super::defaults::DEFAULT_STEPS.to_vec())
    }
}

impl std::str::FromStr for StepSequence {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut steps = Vec::new();
        for raw in s.split(',') {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            let step: u64 = value.parse().map_err(|err| ValidationError::InvalidStep {
                value: value.to_owned(),
                source: err,
            })?;
            steps.push(step);
        }
        StepSequence::new(steps)
    }
}

impl std::fmt::Display for StepSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}
