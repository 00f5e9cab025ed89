use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{FailureKind, Measurement, Outcome, PhaseTimings};

/// Running statistics for one target.
///
/// Folding is order independent: any permutation of the same measurements
/// produces an equal aggregate, and [`AggregateResult::merge`] is associative
/// and commutative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Executions scheduled for the target.
    pub requests_issued: u64,
    /// Measurements folded in, `successful + failed`.
    pub requests_completed: u64,
    pub successful: u64,
    pub failed: u64,
    /// Smallest `total` among successful measurements.
    pub fastest: Option<Duration>,
    /// Largest `total` among successful measurements.
    pub slowest: Option<Duration>,
    pub dns_sum: Duration,
    pub connect_sum: Duration,
    pub tls_sum: Duration,
    pub total_sum: Duration,
    pub status_counts: BTreeMap<String, u64>,
    pub failure_counts: BTreeMap<FailureKind, u64>,
}

impl AggregateResult {
    #[must_use]
    pub fn new(requests_issued: u64) -> Self {
        Self {
            requests_issued,
            ..Self::default()
        }
    }

    /// Returns the aggregate with `measurement` folded in.
    #[must_use]
    pub fn fold(mut self, measurement: &Measurement) -> Self {
        self.record(measurement);
        self
    }

    pub fn record(&mut self, measurement: &Measurement) {
        self.requests_completed = self.requests_completed.saturating_add(1);
        match &measurement.outcome {
            Outcome::Status(status) => {
                self.successful = self.successful.saturating_add(1);
                self.add_phases(&measurement.phases);
                let total = measurement.phases.total;
                self.fastest = Some(self.fastest.map_or(total, |current| current.min(total)));
                self.slowest = Some(self.slowest.map_or(total, |current| current.max(total)));
                let count = self.status_counts.entry(status.clone()).or_insert(0);
                *count = count.saturating_add(1);
            }
            Outcome::Failed(kind) => {
                self.failed = self.failed.saturating_add(1);
                let count = self.failure_counts.entry(*kind).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }

    /// Combines two aggregates of the same target.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        self.requests_issued = self.requests_issued.saturating_add(other.requests_issued);
        self.requests_completed = self
            .requests_completed
            .saturating_add(other.requests_completed);
        self.successful = self.successful.saturating_add(other.successful);
        self.failed = self.failed.saturating_add(other.failed);
        self.fastest = merge_extreme(self.fastest, other.fastest, Duration::min);
        self.slowest = merge_extreme(self.slowest, other.slowest, Duration::max);
        self.dns_sum = self.dns_sum.saturating_add(other.dns_sum);
        self.connect_sum = self.connect_sum.saturating_add(other.connect_sum);
        self.tls_sum = self.tls_sum.saturating_add(other.tls_sum);
        self.total_sum = self.total_sum.saturating_add(other.total_sum);
        for (status, count) in &other.status_counts {
            let entry = self.status_counts.entry(status.clone()).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
        for (kind, count) in &other.failure_counts {
            let entry = self.failure_counts.entry(*kind).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
        self
    }

    /// Mean phase timings over the successful measurements, or `None` when no
    /// measurement contributed durations.
    #[must_use]
    pub fn averages(&self) -> Option<PhaseTimings> {
        if self.successful == 0 {
            return None;
        }
        Some(PhaseTimings {
            dns: average(self.dns_sum, self.successful),
            connect: average(self.connect_sum, self.successful),
            tls: average(self.tls_sum, self.successful),
            total: average(self.total_sum, self.successful),
        })
    }

    fn add_phases(&mut self, phases: &PhaseTimings) {
        self.dns_sum = self.dns_sum.saturating_add(phases.dns);
        self.connect_sum = self.connect_sum.saturating_add(phases.connect);
        self.tls_sum = self.tls_sum.saturating_add(phases.tls);
        self.total_sum = self.total_sum.saturating_add(phases.total);
    }
}

fn merge_extreme(
    left: Option<Duration>,
    right: Option<Duration>,
    pick: fn(Duration, Duration) -> Duration,
) -> Option<Duration> {
    match (left, right) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (Some(value), None) | (None, Some(value)) => Some(value),
        (None, None) => None,
    }
}

fn average(sum: Duration, count: u64) -> Duration {
    let nanos = sum
        .as_nanos()
        .checked_div(u128::from(count))
        .unwrap_or_default();
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
