use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat, parse_duration};
use crate::error::ValidationError;

/// Settings read from `hpstress.toml` / `hpstress.json`. Every field is
/// optional and only fills options the command line left unset.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(alias = "concurrency")]
    pub workers: Option<usize>,
    pub show_requests: Option<bool>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub timeout: Option<DurationValue>,
    pub keep_alive: Option<bool>,
    pub insecure: Option<bool>,
    pub deadline: Option<DurationValue>,
    pub output_format: Option<OutputFormat>,
    pub targets_dir: Option<String>,
    pub ramp: Option<RampConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RampConfigFile {
    #[serde(alias = "max_time")]
    pub time_budget: Option<DurationValue>,
    pub steps: Option<Vec<u64>>,
    pub pause: Option<DurationValue>,
    pub max_iterations: Option<u64>,
}

/// A duration given either as whole seconds or as text such as `250ms`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration(text),
        }
    }
}
