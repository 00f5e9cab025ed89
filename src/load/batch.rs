use futures_util::Stream;
use futures_util::stream::FuturesUnordered;

use crate::http::RequestTemplate;
use crate::targets::Target;

use super::pool::{PoolRun, WorkerPool};

/// Runs every target concurrently, one pool run each, and yields each result
/// as soon as that target finishes. Nothing starts until the stream is polled.
pub fn run_all<'run>(
    pool: &'run WorkerPool,
    template: &'run RequestTemplate,
    targets: Vec<Target>,
) -> impl Stream<Item = (Target, PoolRun)> + 'run {
    targets
        .into_iter()
        .map(|target| async move {
            let request = template.request_for(target.parsed_url().clone());
            let run = pool.run(request, target.repeat_count()).await;
            (target, run)
        })
        .collect::<FuturesUnordered<_>>()
}
