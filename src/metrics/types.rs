use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Transport-level failure class of a request that never produced a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FailureKind {
    #[serde(rename = "dns_error")]
    Dns,
    #[serde(rename = "connect_error")]
    Connect,
    #[serde(rename = "tls_error")]
    Tls,
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "other")]
    Other,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::Dns => "dns_error",
            FailureKind::Connect => "connect_error",
            FailureKind::Tls => "tls_error",
            FailureKind::Timeout => "timeout",
            FailureKind::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time spent in each network phase of one request.
///
/// `total` runs from dispatch to the first response byte (or to the failure).
/// Phases a request skipped, such as DNS for an IP literal or everything but
/// `total` on a reused connection, stay zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub dns: Duration,
    pub connect: Duration,
    pub tls: Duration,
    pub total: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Status line of the response head, e.g. `200 OK`.
    Status(String),
    Failed(FailureKind),
}

/// Result of exactly one executed request attempt.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub outcome: Outcome,
    pub phases: PhaseTimings,
    pub started_at: DateTime<Local>,
}

impl Measurement {
    #[must_use]
    pub fn success(status: impl Into<String>, phases: PhaseTimings) -> Self {
        Self {
            outcome: Outcome::Status(status.into()),
            phases,
            started_at: Local::now(),
        }
    }

    #[must_use]
    pub fn failure(kind: FailureKind, phases: PhaseTimings) -> Self {
        Self {
            outcome: Outcome::Failed(kind),
            phases,
            started_at: Local::now(),
        }
    }

    #[must_use]
    pub fn with_started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Status(_))
    }
}
