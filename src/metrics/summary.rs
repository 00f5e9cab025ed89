use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::aggregate::AggregateResult;

/// Microseconds per millisecond.
const US_PER_MS: u128 = 1_000;
const NO_DATA: &str = "no data";

/// Per-phase means in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseAverages {
    pub dns_us: u64,
    pub connect_us: u64,
    pub tls_us: u64,
    pub total_us: u64,
}

/// Report view of one target's aggregate, printable as text or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    pub url: String,
    pub method: String,
    pub requests_issued: u64,
    pub requests_completed: u64,
    pub successful: u64,
    pub failed: u64,
    pub fastest_us: Option<u64>,
    pub slowest_us: Option<u64>,
    /// `None` when no request succeeded.
    pub averages: Option<PhaseAverages>,
    pub status_counts: BTreeMap<String, u64>,
    pub failure_counts: BTreeMap<String, u64>,
    pub cancelled: bool,
}

impl AggregateSummary {
    #[must_use]
    pub fn new(url: &str, method: &str, aggregate: &AggregateResult, cancelled: bool) -> Self {
        let averages = aggregate.averages().map(|avg| PhaseAverages {
            dns_us: micros(avg.dns),
            connect_us: micros(avg.connect),
            tls_us: micros(avg.tls),
            total_us: micros(avg.total),
        });
        Self {
            url: url.to_owned(),
            method: method.to_owned(),
            requests_issued: aggregate.requests_issued,
            requests_completed: aggregate.requests_completed,
            successful: aggregate.successful,
            failed: aggregate.failed,
            fastest_us: aggregate.fastest.map(micros),
            slowest_us: aggregate.slowest.map(micros),
            averages,
            status_counts: aggregate.status_counts.clone(),
            failure_counts: aggregate
                .failure_counts
                .iter()
                .map(|(kind, count)| (kind.as_str().to_owned(), *count))
                .collect(),
            cancelled,
        }
    }
}

pub(crate) fn summary_lines(summary: &AggregateSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("URL: {}", summary.url));
    lines.push(format!("Method: {}", summary.method));
    lines.push(format!(
        "Requests: {} issued / {} completed",
        summary.requests_issued, summary.requests_completed
    ));
    lines.push(format!("Successful: {}", summary.successful));
    lines.push(format!("Failed: {}", summary.failed));
    if summary.cancelled {
        lines.push("Cancelled: run stopped before all requests completed".to_owned());
    }

    if let (Some(fastest), Some(slowest)) = (summary.fastest_us, summary.slowest_us) {
        lines.push(format!(
            "Fastest/Slowest: {} / {}",
            format_micros(fastest),
            format_micros(slowest)
        ));
    } else {
        lines.push(format!("Fastest/Slowest: {}", NO_DATA));
    }

    if let Some(avg) = summary.averages {
        lines.push(format!("Avg DNS: {}", format_micros(avg.dns_us)));
        lines.push(format!("Avg Connect: {}", format_micros(avg.connect_us)));
        lines.push(format!("Avg TLS: {}", format_micros(avg.tls_us)));
        lines.push(format!("Avg Total: {}", format_micros(avg.total_us)));
    } else {
        lines.push(format!("Averages: {}", NO_DATA));
    }

    if !summary.status_counts.is_empty() {
        lines.push("Status codes:".to_owned());
        for (status, count) in &summary.status_counts {
            lines.push(format!("  {}: {}", status, count));
        }
    }
    if !summary.failure_counts.is_empty() {
        lines.push("Failures:".to_owned());
        for (kind, count) in &summary.failure_counts {
            lines.push(format!("  {}: {}", kind, count));
        }
    }
    lines
}

/// Formats a duration as milliseconds with microsecond precision, e.g. `12.345ms`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    format_micros(micros(duration))
}

fn format_micros(value: u64) -> String {
    let value = u128::from(value);
    format!("{}.{:03}ms", value / US_PER_MS, value % US_PER_MS)
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
