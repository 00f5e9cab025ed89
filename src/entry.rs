use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::Cli;
use crate::error::{AppResult, ValidationError};

/// Parses the command line, applies the config file and runs the
/// subcommand on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when configuration is invalid, the runtime cannot be
/// built, or the subcommand fails.
pub fn run() -> AppResult<()> {
    let (cli, matches) = parse_args()?;
    crate::logger::init_logging(cli.verbose);
    let cli = apply_config(cli, &matches)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| ValidationError::RuntimeBuildFailed { source: err })?;

    runtime.block_on(crate::app::dispatch(&cli))
}

fn parse_args() -> AppResult<(Cli, ArgMatches)> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    Ok((cli, matches))
}

fn apply_config(mut cli: Cli, matches: &ArgMatches) -> AppResult<Cli> {
    if let Some(config) = crate::config::load_config(cli.config.as_deref())? {
        crate::config::apply_config(&mut cli, matches, &config)?;
    }
    Ok(cli)
}
