use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::args::{PositiveU64, StepSequence};
use crate::http::RequestSpec;
use crate::metrics::AggregateResult;
use crate::shutdown::ShutdownReceiver;

use super::pool::{PoolRun, WorkerPool};

/// Something that can run a batch of `load` requests and report on it.
#[async_trait]
pub trait LoadRunner: Send + Sync {
    async fn run_load(&self, load: u64) -> PoolRun;
}

/// Drives a [`WorkerPool`] against one request.
pub struct PoolLoadRunner {
    pool: WorkerPool,
    request: RequestSpec,
}

impl PoolLoadRunner {
    #[must_use]
    pub const fn new(pool: WorkerPool, request: RequestSpec) -> Self {
        Self { pool, request }
    }
}

#[async_trait]
impl LoadRunner for PoolLoadRunner {
    async fn run_load(&self, load: u64) -> PoolRun {
        self.pool.run(self.request.clone(), load).await
    }
}

#[derive(Debug, Clone)]
pub struct RampConfig {
    /// Longest acceptable wall-clock duration of one batch.
    pub time_budget: Duration,
    pub steps: StepSequence,
    /// Courtesy pause between batches.
    pub pause: Duration,
    pub max_iterations: PositiveU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RampStop {
    /// A batch at the finest step ran over budget.
    BudgetExceeded,
    /// Too many batches without going over budget.
    IterationLimit,
    /// The shutdown signal fired.
    Cancelled,
}

impl RampStop {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RampStop::BudgetExceeded => "budget_exceeded",
            RampStop::IterationLimit => "iteration_limit",
            RampStop::Cancelled => "cancelled",
        }
    }
}

/// A batch that finished within the time budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampProbe {
    pub load: u64,
    pub elapsed: Duration,
    pub aggregate: AggregateResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampOutcome {
    /// Load of the last batch that ran.
    pub final_load: u64,
    /// Aggregate of the last batch that ran; for `BudgetExceeded` this is the
    /// breaking-point batch.
    pub aggregate: AggregateResult,
    pub last_good: Option<RampProbe>,
    pub iterations: u64,
    pub stop: RampStop,
}

/// Searches for the largest load whose batch still completes within the time
/// budget, growing by coarse steps first and switching to finer ones each time
/// a batch runs over.
pub async fn find_sustainable_load<R>(
    runner: &R,
    config: &RampConfig,
    mut shutdown_rx: ShutdownReceiver,
) -> RampOutcome
where
    R: LoadRunner + ?Sized,
{
    let steps = &config.steps;
    let max_iterations = config.max_iterations.get();
    let mut step_index: usize = 0;
    let mut load = steps.first();
    let mut last_good: Option<RampProbe> = None;
    let mut iterations: u64 = 0;
    let mut latest: Option<(u64, AggregateResult)> = None;

    loop {
        if shutdown_rx.is_cancelled() {
            let (final_load, aggregate) = latest.unwrap_or((load, AggregateResult::default()));
            return RampOutcome {
                final_load,
                aggregate,
                last_good,
                iterations,
                stop: RampStop::Cancelled,
            };
        }

        iterations = iterations.saturating_add(1);
        let started = Instant::now();
        let run = runner.run_load(load).await;
        let elapsed = started.elapsed();
        let ran_load = load;
        info!(
            "Ramp batch {}: load {} took {:?} (budget {:?}, step {})",
            iterations,
            ran_load,
            elapsed,
            config.time_budget,
            steps.get(step_index).unwrap_or(1)
        );

        if run.cancelled {
            return RampOutcome {
                final_load: ran_load,
                aggregate: run.aggregate,
                last_good,
                iterations,
                stop: RampStop::Cancelled,
            };
        }

        if elapsed <= config.time_budget {
            last_good = Some(RampProbe {
                load: ran_load,
                elapsed,
                aggregate: run.aggregate.clone(),
            });
            load = ran_load.saturating_add(steps.get(step_index).unwrap_or(1));
        } else if step_index >= steps.last_index() {
            debug!("Load {} is over budget at the finest step", ran_load);
            return RampOutcome {
                final_load: ran_load,
                aggregate: run.aggregate,
                last_good,
                iterations,
                stop: RampStop::BudgetExceeded,
            };
        } else {
            step_index = step_index.saturating_add(1);
            if let Some(good) = &last_good {
                load = good
                    .load
                    .saturating_add(steps.get(step_index).unwrap_or(1));
            }
            debug!(
                "Load {} is over budget, retrying at {} with step {}",
                ran_load,
                load,
                steps.get(step_index).unwrap_or(1)
            );
        }

        if iterations >= max_iterations {
            return RampOutcome {
                final_load: ran_load,
                aggregate: run.aggregate,
                last_good,
                iterations,
                stop: RampStop::IterationLimit,
            };
        }

        latest = Some((ran_load, run.aggregate));
        tokio::select! {
            () = shutdown_rx.cancelled() => {}
            () = tokio::time::sleep(config.pause) => {}
        }
    }
}
