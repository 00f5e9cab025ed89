//! Subcommand implementations.
mod execute;
mod oneshot;
mod output;
mod ramp;
mod serve;
mod session;
mod stress;
mod target_files;


use crate::args::{Cli, Command};
use crate::error::AppResult;

/// Runs the parsed subcommand.
///
/// # Errors
///
/// Returns an error when setup fails, when a target file has no runnable
/// targets, or when a target file operation fails.
pub async fn dispatch(cli: &Cli) -> AppResult<()> {
    match &cli.command {
        Command::Stress(args) => stress::run_stress(args).await,
        Command::Ramp(args) => ramp::run_ramp(args).await,
        Command::Execute(args) => execute::run_execute(args, &cli.targets_dir).await,
        Command::Create(args) => target_files::run_create(args, &cli.targets_dir),
        Command::Add(args) => target_files::run_add(args, &cli.targets_dir),
        Command::Remove(args) => target_files::run_remove(args, &cli.targets_dir),
        Command::Get(args) => oneshot::run_get(args).await,
        Command::Fetch(args) => oneshot::run_fetch(args).await,
        Command::Serve(args) => serve::run_serve(args).await,
    }
}
