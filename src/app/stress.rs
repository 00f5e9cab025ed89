use tracing::info;

use crate::args::StressArgs;
use crate::error::{AppError, AppResult};
use crate::metrics::AggregateSummary;
use crate::targets::Target;

use super::output::print_summary;
use super::session::RunSession;

pub(crate) async fn run_stress(args: &StressArgs) -> AppResult<()> {
    let target = Target::new(&args.url, args.count).map_err(AppError::input)?;
    let session = RunSession::start(&args.run)?;

    info!(
        "Sending {} {} request(s) to {} with {} worker(s)",
        target.repeat_count(),
        args.run.method.as_str(),
        target.url(),
        session.pool().concurrency()
    );
    let request = session.template().request_for(target.parsed_url().clone());
    let run = session.pool().run(request, target.repeat_count()).await;
    session.finish().await;

    let summary = AggregateSummary::new(
        target.url(),
        args.run.method.as_str(),
        &run.aggregate,
        run.cancelled,
    );
    print_summary(&summary, args.run.output_format)
}
