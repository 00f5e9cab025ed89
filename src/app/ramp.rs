use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::args::{OutputFormat, PositiveU64, RampArgs};
use crate::error::{AppError, AppResult};
use crate::load::{PoolLoadRunner, RampConfig, RampOutcome, RampStop, find_sustainable_load};
use crate::metrics::{AggregateSummary, format_duration, summary_lines};
use crate::targets::Target;

use super::session::RunSession;

/// Result of a ramp search as printed to the user.
#[derive(Debug, Serialize)]
pub(crate) struct RampReport {
    pub(crate) final_load: u64,
    pub(crate) iterations: u64,
    pub(crate) stop: RampStop,
    pub(crate) time_budget_us: u64,
    pub(crate) last_good_load: Option<u64>,
    pub(crate) last_good_elapsed_us: Option<u64>,
    /// The last batch that ran; the breaking point when the budget was exceeded.
    pub(crate) final_batch: AggregateSummary,
    pub(crate) last_good: Option<AggregateSummary>,
}

impl RampReport {
    pub(crate) fn new(
        url: &str,
        method: &str,
        time_budget: Duration,
        outcome: &RampOutcome,
    ) -> Self {
        let cancelled = outcome.stop == RampStop::Cancelled;
        Self {
            final_load: outcome.final_load,
            iterations: outcome.iterations,
            stop: outcome.stop,
            time_budget_us: micros(time_budget),
            last_good_load: outcome.last_good.as_ref().map(|good| good.load),
            last_good_elapsed_us: outcome.last_good.as_ref().map(|good| micros(good.elapsed)),
            final_batch: AggregateSummary::new(url, method, &outcome.aggregate, cancelled),
            last_good: outcome
                .last_good
                .as_ref()
                .map(|good| AggregateSummary::new(url, method, &good.aggregate, false)),
        }
    }
}

pub(crate) fn ramp_lines(report: &RampReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Ramp stopped: {} after {} batch(es)",
            report.stop.as_str(),
            report.iterations
        ),
        format!(
            "Time budget: {}",
            format_duration(Duration::from_micros(report.time_budget_us))
        ),
        format!("Final load: {}", report.final_load),
    ];
    match (report.last_good_load, report.last_good_elapsed_us) {
        (Some(load), Some(elapsed)) => lines.push(format!(
            "Last good load: {} (took {})",
            load,
            format_duration(Duration::from_micros(elapsed))
        )),
        (Some(load), None) => lines.push(format!("Last good load: {}", load)),
        (None, _) => lines.push("Last good load: none".to_owned()),
    }
    lines.push("Final batch:".to_owned());
    lines.extend(
        summary_lines(&report.final_batch)
            .into_iter()
            .map(|line| format!("  {}", line)),
    );
    lines
}

pub(crate) async fn run_ramp(args: &RampArgs) -> AppResult<()> {
    let target = Target::new(&args.url, PositiveU64::MIN).map_err(AppError::input)?;
    let config = RampConfig {
        time_budget: args.time_budget,
        steps: args.steps.clone(),
        pause: args.pause,
        max_iterations: args.max_iterations,
    };
    let session = RunSession::start(&args.run)?;

    info!(
        "Ramping {} {} with budget {:?} and steps {}",
        args.run.method.as_str(),
        target.url(),
        config.time_budget,
        config.steps
    );
    let request = session.template().request_for(target.parsed_url().clone());
    let shutdown_rx = session.pool().shutdown_receiver();
    let runner = PoolLoadRunner::new(session.pool().clone(), request);
    let outcome = find_sustainable_load(&runner, &config, shutdown_rx).await;
    drop(runner);
    session.finish().await;

    let report = RampReport::new(
        target.url(),
        args.run.method.as_str(),
        config.time_budget,
        &outcome,
    );
    match args.run.output_format {
        OutputFormat::Text => {
            for line in ramp_lines(&report) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
    }
    Ok(())
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
