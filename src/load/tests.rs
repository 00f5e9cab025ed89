use super::*;
use crate::args::{HttpMethod, PositiveU64, PositiveUsize, StepSequence};
use crate::error::{AppError, AppResult};
use crate::http::{Probe, RequestSpec, RequestTemplate};
use crate::metrics::{AggregateResult, FailureKind, Measurement, PhaseTimings};
use crate::shutdown::shutdown_channel;
use crate::targets::Target;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn request(url: &str) -> AppResult<RequestSpec> {
    let parsed = Url::parse(url).map_err(|err| AppError::validation(err.to_string()))?;
    Ok(RequestSpec::new(HttpMethod::Get, parsed))
}

fn workers(value: usize) -> AppResult<PositiveUsize> {
    Ok(PositiveUsize::try_from(value)?)
}

fn ok_measurement(total: Duration) -> Measurement {
    Measurement::success(
        "200 OK",
        PhaseTimings {
            total,
            ..PhaseTimings::default()
        },
    )
}

/// Records how many executions overlap.
#[derive(Default)]
struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Probe for ConcurrencyProbe {
    async fn execute(&self, _request: &RequestSpec) -> Measurement {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ok_measurement(Duration::from_millis(5))
    }
}

/// The first `fast` executions finish immediately; the rest never do.
struct StallingProbe {
    fast: usize,
    started: AtomicUsize,
}

#[async_trait]
impl Probe for StallingProbe {
    async fn execute(&self, _request: &RequestSpec) -> Measurement {
        let index = self.started.fetch_add(1, Ordering::SeqCst);
        if index < self.fast {
            return ok_measurement(Duration::from_millis(1));
        }
        std::future::pending::<()>().await;
        Measurement::failure(FailureKind::Other, PhaseTimings::default())
    }
}

/// Delays by the number in the URL path, e.g. `/30` sleeps 30ms.
struct PathDelayProbe;

#[async_trait]
impl Probe for PathDelayProbe {
    async fn execute(&self, request: &RequestSpec) -> Measurement {
        let millis = request
            .url
            .path()
            .trim_start_matches('/')
            .parse::<u64>()
            .unwrap_or(0);
        let delay = Duration::from_millis(millis);
        tokio::time::sleep(delay).await;
        ok_measurement(delay)
    }
}

/// Batch duration equals `load` milliseconds.
struct LinearRunner;

#[async_trait]
impl LoadRunner for LinearRunner {
    async fn run_load(&self, load: u64) -> PoolRun {
        tokio::time::sleep(Duration::from_millis(load)).await;
        PoolRun {
            aggregate: AggregateResult::new(load),
            cancelled: false,
        }
    }
}

/// Never exceeds any budget.
struct InstantRunner;

#[async_trait]
impl LoadRunner for InstantRunner {
    async fn run_load(&self, load: u64) -> PoolRun {
        PoolRun {
            aggregate: AggregateResult::new(load),
            cancelled: false,
        }
    }
}

fn ramp_config(budget: Duration, max_iterations: u64) -> AppResult<RampConfig> {
    Ok(RampConfig {
        time_budget: budget,
        steps: StepSequence::new(vec![100, 50, 10, 5, 1])?,
        pause: Duration::from_secs(1),
        max_iterations: PositiveU64::try_from(max_iterations)?,
    })
}

#[test]
fn pool_never_exceeds_concurrency_limit() -> AppResult<()> {
    run_async_test(async {
        let probe = Arc::new(ConcurrencyProbe::default());
        let (_shutdown_tx, shutdown_rx) = shutdown_channel();
        let pool = WorkerPool::new(probe.clone(), workers(3)?, shutdown_rx);

        let run = pool.run(request("http://localhost/")?, 10).await;

        let peak = probe.peak.load(Ordering::SeqCst);
        if peak > 3 || peak == 0 {
            return Err(AppError::validation(format!(
                "Expected at most 3 in flight, saw {}",
                peak
            )));
        }
        if run.aggregate.requests_completed != 10 || run.aggregate.requests_issued != 10 {
            return Err(AppError::validation("Expected all 10 requests folded"));
        }
        if run.cancelled {
            return Err(AppError::validation("Run should not be cancelled"));
        }
        Ok(())
    })
}

#[test]
fn pool_forwards_trace_events() -> AppResult<()> {
    run_async_test(async {
        let (_shutdown_tx, shutdown_rx) = shutdown_channel();
        let (trace_tx, mut trace_rx) = mpsc::channel(16);
        let pool = WorkerPool::new(Arc::new(PathDelayProbe), workers(2)?, shutdown_rx)
            .with_trace(trace_tx);

        let run = pool.run(request("http://localhost/1")?, 4).await;
        drop(pool);

        let mut traced = 0;
        while let Some(event) = trace_rx.recv().await {
            if event.url != "http://localhost/1" {
                return Err(AppError::validation("Unexpected trace url"));
            }
            traced += 1;
        }
        if traced != 4 || run.aggregate.successful != 4 {
            return Err(AppError::validation(format!(
                "Expected 4 traced requests, got {}",
                traced
            )));
        }
        Ok(())
    })
}

#[test]
fn cancellation_stops_promptly_with_partial_aggregate() -> AppResult<()> {
    run_async_test(async {
        let probe = Arc::new(StallingProbe {
            fast: 5,
            started: AtomicUsize::new(0),
        });
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let pool = WorkerPool::new(probe.clone(), workers(20)?, shutdown_rx);

        let trigger = async {
            while probe.started.load(Ordering::SeqCst) < 20 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            shutdown_tx.trigger();
        };
        let stalled = request("http://localhost/")?;
        let (run, ()) = tokio::time::timeout(Duration::from_secs(2), async {
            tokio::join!(pool.run(stalled, 20), trigger)
        })
        .await
        .map_err(|err| AppError::validation(format!("Pool did not stop: {}", err)))?;

        if !run.cancelled {
            return Err(AppError::validation("Expected cancelled run"));
        }
        if run.aggregate.requests_completed > 5 {
            return Err(AppError::validation(format!(
                "Expected at most 5 folded, got {}",
                run.aggregate.requests_completed
            )));
        }
        if run.aggregate.failed != 0 {
            return Err(AppError::validation("Aborted executions must not be folded"));
        }
        Ok(())
    })
}

#[test]
fn pool_returns_immediately_when_already_cancelled() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        shutdown_tx.trigger();
        let pool = WorkerPool::new(Arc::new(PathDelayProbe), workers(4)?, shutdown_rx);
        let run = pool.run(request("http://localhost/1000")?, 50).await;
        if !run.cancelled || run.aggregate.requests_issued != 0 {
            return Err(AppError::validation("Expected nothing scheduled"));
        }
        Ok(())
    })
}

#[tokio::test(start_paused = true)]
async fn ramp_converges_between_coarse_steps() -> AppResult<()> {
    let (_shutdown_tx, shutdown_rx) = shutdown_channel();
    let config = ramp_config(Duration::from_millis(120), 100)?;

    let outcome = find_sustainable_load(&LinearRunner, &config, shutdown_rx).await;

    if outcome.stop != RampStop::BudgetExceeded {
        return Err(AppError::validation(format!(
            "Unexpected stop: {}",
            outcome.stop.as_str()
        )));
    }
    if outcome.final_load <= 100 || outcome.final_load > 150 {
        return Err(AppError::validation(format!(
            "Final load {} outside (100, 150]",
            outcome.final_load
        )));
    }
    if outcome.last_good.as_ref().map(|good| good.load) != Some(120) {
        return Err(AppError::validation("Expected 120 as last good load"));
    }
    if outcome.aggregate.requests_issued != outcome.final_load {
        return Err(AppError::validation(
            "Expected the over-budget batch as the reported aggregate",
        ));
    }
    if outcome.iterations > 20 {
        return Err(AppError::validation(format!(
            "Too many iterations: {}",
            outcome.iterations
        )));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn ramp_stops_at_iteration_limit() -> AppResult<()> {
    let (_shutdown_tx, shutdown_rx) = shutdown_channel();
    let config = ramp_config(Duration::from_secs(1), 5)?;

    let outcome = find_sustainable_load(&InstantRunner, &config, shutdown_rx).await;

    if outcome.stop != RampStop::IterationLimit || outcome.iterations != 5 {
        return Err(AppError::validation("Expected iteration limit after 5 batches"));
    }
    if outcome.final_load != 500 {
        return Err(AppError::validation(format!(
            "Expected final load 500, got {}",
            outcome.final_load
        )));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn ramp_reports_cancellation() -> AppResult<()> {
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    shutdown_tx.trigger();
    let config = ramp_config(Duration::from_secs(1), 100)?;

    let outcome = find_sustainable_load(&InstantRunner, &config, shutdown_rx).await;

    if outcome.stop != RampStop::Cancelled || outcome.iterations != 0 {
        return Err(AppError::validation("Expected cancellation before any batch"));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn batch_yields_in_completion_order() -> AppResult<()> {
    let (_shutdown_tx, shutdown_rx) = shutdown_channel();
    let pool = WorkerPool::new(Arc::new(PathDelayProbe), workers(2)?, shutdown_rx);
    let template = RequestTemplate::new(HttpMethod::Get);
    let targets = vec![
        Target::new("localhost/300", PositiveU64::try_from(2_u64)?)?,
        Target::new("localhost/10", PositiveU64::try_from(3_u64)?)?,
        Target::new("localhost/100", PositiveU64::try_from(1_u64)?)?,
    ];

    let results: Vec<(Target, PoolRun)> = run_all(&pool, &template, targets).collect().await;

    let order: Vec<&str> = results.iter().map(|(target, _)| target.url()).collect();
    if order
        != [
            "http://localhost/10",
            "http://localhost/100",
            "http://localhost/300",
        ]
    {
        return Err(AppError::validation(format!(
            "Unexpected completion order: {:?}",
            order
        )));
    }
    for (target, run) in &results {
        if run.aggregate.requests_completed != target.repeat_count() {
            return Err(AppError::validation(format!(
                "Target {} folded {} of {}",
                target.url(),
                run.aggregate.requests_completed,
                target.repeat_count()
            )));
        }
    }
    Ok(())
}
