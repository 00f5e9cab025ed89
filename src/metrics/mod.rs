//! Per-request measurements and their aggregation into target statistics.
mod aggregate;
mod summary;
mod trace;
mod types;


pub use aggregate::AggregateResult;
pub use summary::{AggregateSummary, PhaseAverages, format_duration};
pub(crate) use summary::summary_lines;
pub use trace::trace_line;
pub use types::{FailureKind, Measurement, Outcome, PhaseTimings};
