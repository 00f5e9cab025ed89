use futures_util::StreamExt;
use tracing::{info, warn};

use crate::args::ExecuteArgs;
use crate::error::{AppError, AppResult, InputError};
use crate::load::run_all;
use crate::metrics::AggregateSummary;
use crate::targets::TargetStore;

use super::output::print_summary;
use super::session::RunSession;

/// Runs every target of a target file and prints each summary as soon as its
/// target finishes.
pub(crate) async fn run_execute(args: &ExecuteArgs, targets_dir: &str) -> AppResult<()> {
    let store = TargetStore::new(targets_dir);
    let (path, parsed) = store.load(&args.file)?;

    for err in &parsed.errors {
        warn!("Skipping {}: {}", path.display(), err);
    }
    if parsed.targets.is_empty() {
        return Err(AppError::input(InputError::NoTargets { path }));
    }

    let session = RunSession::start(&args.run)?;
    info!(
        "Running {} target(s) from {} with {} worker(s) each",
        parsed.targets.len(),
        path.display(),
        session.pool().concurrency()
    );

    let method = args.run.method.as_str();
    let mut printed = Ok(());
    {
        let mut results = run_all(session.pool(), session.template(), parsed.targets);
        while let Some((target, run)) = results.next().await {
            let summary =
                AggregateSummary::new(target.url(), method, &run.aggregate, run.cancelled);
            printed = printed.and(print_summary(&summary, args.run.output_format));
        }
    }
    session.finish().await;
    printed
}
