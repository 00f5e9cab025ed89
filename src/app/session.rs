use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::args::{OutputFormat, RunOptions};
use crate::error::AppResult;
use crate::http::{HttpProbe, ProbeConfig, RequestTemplate};
use crate::load::{TraceEvent, WorkerPool};
use crate::metrics::trace_line;
use crate::shutdown::{ShutdownSender, shutdown_channel};
use crate::shutdown_handlers::{setup_deadline_shutdown_handler, setup_signal_shutdown_handler};

/// Trace lines buffered between the pool and the printer.
const TRACE_CHANNEL_CAPACITY: usize = 256;

/// Everything a measured run needs: the worker pool, the request template,
/// shutdown wiring and the optional per-request trace printer.
pub(crate) struct RunSession {
    shutdown_tx: ShutdownSender,
    pool: WorkerPool,
    template: RequestTemplate,
    trace_task: Option<JoinHandle<()>>,
    handlers: Vec<JoinHandle<()>>,
}

impl RunSession {
    pub(crate) fn start(options: &RunOptions) -> AppResult<Self> {
        let template = RequestTemplate::new(options.method)
            .with_headers(&options.headers)?
            .with_body(options.data.clone());
        let probe = HttpProbe::new(probe_config(options))?;

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let mut handlers = vec![setup_signal_shutdown_handler(&shutdown_tx)];
        if let Some(deadline) = options.deadline {
            handlers.push(setup_deadline_shutdown_handler(&shutdown_tx, deadline));
        }

        let mut pool = WorkerPool::new(Arc::new(probe), options.workers, shutdown_rx);
        let trace_task = if options.show_requests {
            let (trace_tx, trace_rx) = mpsc::channel(TRACE_CHANNEL_CAPACITY);
            pool = pool.with_trace(trace_tx);
            Some(tokio::spawn(print_traces(trace_rx, options.output_format)))
        } else {
            None
        };

        Ok(Self {
            shutdown_tx,
            pool,
            template,
            trace_task,
            handlers,
        })
    }

    pub(crate) const fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub(crate) const fn template(&self) -> &RequestTemplate {
        &self.template
    }

    /// Stops the signal handlers and waits for pending trace lines.
    /// Clones of the pool must be dropped first or the printer never ends.
    pub(crate) async fn finish(self) {
        let Self {
            shutdown_tx,
            pool,
            trace_task,
            handlers,
            ..
        } = self;
        shutdown_tx.trigger();
        drop(pool);
        if let Some(task) = trace_task
            && let Err(err) = task.await
        {
            warn!("Trace printer failed: {}", err);
        }
        for handler in handlers {
            if let Err(err) = handler.await {
                debug!("Shutdown handler ended abnormally: {}", err);
            }
        }
    }
}

fn probe_config(options: &RunOptions) -> ProbeConfig {
    ProbeConfig {
        request_timeout: options.request_timeout,
        keep_alive: options.keep_alive,
        insecure: options.insecure,
        ..ProbeConfig::default()
    }
}

/// Prints one line per completed request. JSON runs keep stdout for the
/// summary, so their traces go to stderr.
async fn print_traces(mut trace_rx: mpsc::Receiver<TraceEvent>, format: OutputFormat) {
    while let Some(event) = trace_rx.recv().await {
        let line = trace_line(&event.url, &event.measurement);
        match format {
            OutputFormat::Text => println!("{}", line),
            OutputFormat::Json => eprintln!("{}", line),
        }
    }
}
