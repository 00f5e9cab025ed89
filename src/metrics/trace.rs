use super::summary::format_duration;
use super::types::{Measurement, Outcome};

/// One-line record of a completed request for `--show-requests`.
#[must_use]
pub fn trace_line(url: &str, measurement: &Measurement) -> String {
    let started = measurement.started_at.format("%H:%M:%S%.3f");
    let phases = &measurement.phases;
    match &measurement.outcome {
        Outcome::Status(status) => format!(
            "[{}] {} {} total={} dns={} connect={} tls={}",
            started,
            url,
            status,
            format_duration(phases.total),
            format_duration(phases.dns),
            format_duration(phases.connect),
            format_duration(phases.tls)
        ),
        Outcome::Failed(kind) => format!(
            "[{}] {} failed: {} after {}",
            started,
            url,
            kind,
            format_duration(phases.total)
        ),
    }
}
