//! Bounded worker pool, adaptive ramp search and multi-target batches.
mod batch;
mod pool;
mod ramp;

#[cfg(test)]
mod tests;

pub use batch::run_all;
pub use pool::{PoolRun, TraceEvent, WorkerPool};
pub use ramp::{
    LoadRunner, PoolLoadRunner, RampConfig, RampOutcome, RampProbe, RampStop,
    find_sustainable_load,
};
