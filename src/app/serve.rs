use crate::args::ServeArgs;
use crate::error::AppResult;
use crate::server;
use crate::shutdown::shutdown_channel;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

/// Serves the greeting endpoint until Ctrl+C or SIGTERM.
pub(crate) async fn run_serve(args: &ServeArgs) -> AppResult<()> {
    let listener = server::bind(&args.bind, args.port).await?;
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let handler = setup_signal_shutdown_handler(&shutdown_tx);
    server::run(listener, shutdown_rx).await;
    handler.await?;
    Ok(())
}
