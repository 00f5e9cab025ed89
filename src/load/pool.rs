use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::args::PositiveUsize;
use crate::http::{Probe, RequestSpec};
use crate::metrics::{AggregateResult, Measurement};
use crate::shutdown::ShutdownReceiver;

/// Capacity of the measurement and trace channels per in-flight slot.
const CHANNEL_SLOTS_PER_WORKER: usize = 2;

/// A completed request forwarded for `--show-requests`.
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub url: String,
    pub measurement: Measurement,
}

/// Outcome of one pool run against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRun {
    pub aggregate: AggregateResult,
    /// The shutdown signal stopped the run before every execution finished.
    pub cancelled: bool,
}

/// Runs a fixed number of executions with bounded concurrency and folds the
/// measurements as they complete.
#[derive(Clone)]
pub struct WorkerPool {
    probe: Arc<dyn Probe>,
    concurrency: usize,
    shutdown_rx: ShutdownReceiver,
    trace_tx: Option<mpsc::Sender<TraceEvent>>,
}

impl WorkerPool {
    #[must_use]
    pub fn new(
        probe: Arc<dyn Probe>,
        concurrency: PositiveUsize,
        shutdown_rx: ShutdownReceiver,
    ) -> Self {
        Self {
            probe,
            concurrency: concurrency.get(),
            shutdown_rx,
            trace_tx: None,
        }
    }

    /// Also forwards every completed measurement to `trace_tx`.
    #[must_use]
    pub fn with_trace(mut self, trace_tx: mpsc::Sender<TraceEvent>) -> Self {
        self.trace_tx = Some(trace_tx);
        self
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// A receiver for the shutdown signal this pool obeys.
    #[must_use]
    pub fn shutdown_receiver(&self) -> ShutdownReceiver {
        self.shutdown_rx.clone()
    }

    /// Executes `request` `count` times with at most `concurrency` in flight.
    ///
    /// Returns once every scheduled execution has finished, or promptly after
    /// the shutdown signal fires. Executions aborted by shutdown are not
    /// folded.
    pub async fn run(&self, request: RequestSpec, count: u64) -> PoolRun {
        let request = Arc::new(request);
        let url = request.url.to_string();
        let capacity = self.concurrency.saturating_mul(CHANNEL_SLOTS_PER_WORKER);
        let (measurement_tx, mut measurement_rx) = mpsc::channel::<Measurement>(capacity);

        let scheduler = self.schedule(Arc::clone(&request), count, measurement_tx);

        let consumer = async {
            let mut aggregate = AggregateResult::default();
            while let Some(measurement) = measurement_rx.recv().await {
                aggregate.record(&measurement);
                if let Some(trace_tx) = &self.trace_tx {
                    let event = TraceEvent {
                        url: url.clone(),
                        measurement,
                    };
                    drop(trace_tx.send(event).await);
                }
            }
            aggregate
        };

        let ((scheduled, cancelled), mut aggregate) = tokio::join!(scheduler, consumer);
        aggregate.requests_issued = scheduled;
        debug!(
            "Pool run against {} finished: {} scheduled, {} completed, cancelled={}",
            url, scheduled, aggregate.requests_completed, cancelled
        );
        PoolRun {
            aggregate,
            cancelled,
        }
    }

    /// Spawns executions as permits free up, then waits for all of them.
    /// Returns the number scheduled and whether shutdown interrupted the run.
    async fn schedule(
        &self,
        request: Arc<RequestSpec>,
        count: u64,
        measurement_tx: mpsc::Sender<Measurement>,
    ) -> (u64, bool) {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut tasks = JoinSet::new();
        let mut scheduled: u64 = 0;
        let mut cancelled = false;

        while scheduled < count {
            let permit = tokio::select! {
                biased;
                () = shutdown_rx.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(err) => {
                        warn!("Worker permits closed: {}", err);
                        break;
                    }
                },
            };

            let probe = Arc::clone(&self.probe);
            let request = Arc::clone(&request);
            let measurement_tx = measurement_tx.clone();
            tasks.spawn(async move {
                let measurement = probe.execute(&request).await;
                drop(permit);
                drop(measurement_tx.send(measurement).await);
            });
            scheduled = scheduled.saturating_add(1);
        }
        drop(measurement_tx);

        while !cancelled {
            tokio::select! {
                biased;
                () = shutdown_rx.cancelled() => cancelled = true,
                joined = tasks.join_next() => match joined {
                    Some(Ok(())) => {}
                    Some(Err(err)) => warn!("Request task failed: {}", err),
                    None => break,
                },
            }
        }

        if cancelled {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
        (scheduled, cancelled)
    }
}
