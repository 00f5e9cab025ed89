use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{
    Cli, Command, PositiveU64, PositiveUsize, RampArgs, RunOptions, StepSequence, parse_header,
};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DurationValue, RampConfigFile};

/// Applies configuration values to options the command line left unset.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(cli: &mut Cli, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "targets_dir")
        && let Some(dir) = config.targets_dir.clone()
    {
        cli.targets_dir = dir;
    }

    let Some((_, sub_matches)) = matches.subcommand() else {
        return Ok(());
    };

    match &mut cli.command {
        Command::Stress(args) => apply_run_options(&mut args.run, sub_matches, config),
        Command::Execute(args) => apply_run_options(&mut args.run, sub_matches, config),
        Command::Ramp(args) => {
            apply_run_options(&mut args.run, sub_matches, config)?;
            match &config.ramp {
                Some(ramp) => apply_ramp(args, sub_matches, ramp),
                None => Ok(()),
            }
        }
        Command::Create(_)
        | Command::Add(_)
        | Command::Remove(_)
        | Command::Get(_)
        | Command::Fetch(_)
        | Command::Serve(_) => Ok(()),
    }
}

fn apply_run_options(
    run: &mut RunOptions,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "workers")
        && let Some(workers) = config.workers
    {
        run.workers = PositiveUsize::try_from(workers)
            .map_err(|_err| AppError::config(ConfigError::ConcurrencyZero))?;
    }

    if !is_cli(matches, "show_requests")
        && let Some(show) = config.show_requests
    {
        run.show_requests = show;
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        run.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        run.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        run.data = Some(data);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        run.request_timeout = match timeout.to_duration() {
            Err(ValidationError::DurationZero) => {
                return Err(AppError::config(ConfigError::RequestTimeoutZero));
            }
            other => other.map_err(|err| invalid_field("timeout", err))?,
        };
    }

    if !is_cli(matches, "keep_alive")
        && let Some(keep_alive) = config.keep_alive
    {
        run.keep_alive = keep_alive;
    }

    if !is_cli(matches, "insecure")
        && let Some(insecure) = config.insecure
    {
        run.insecure = insecure;
    }

    if !is_cli(matches, "deadline")
        && let Some(deadline) = config.deadline.as_ref()
    {
        run.deadline = Some(duration_field(deadline, "deadline")?);
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        run.output_format = format;
    }

    Ok(())
}

fn apply_ramp(args: &mut RampArgs, matches: &ArgMatches, ramp: &RampConfigFile) -> AppResult<()> {
    if !is_cli(matches, "time_budget")
        && let Some(budget) = ramp.time_budget.as_ref()
    {
        args.time_budget = match budget.to_duration() {
            Err(ValidationError::DurationZero) => {
                return Err(AppError::config(ConfigError::TimeBudgetZero));
            }
            other => other.map_err(|err| invalid_field("ramp.time_budget", err))?,
        };
    }

    if !is_cli(matches, "steps")
        && let Some(steps) = ramp.steps.clone()
    {
        args.steps = StepSequence::new(steps)
            .map_err(|err| AppError::config(ConfigError::InvalidSteps { source: err }))?;
    }

    if !is_cli(matches, "pause")
        && let Some(pause) = ramp.pause.as_ref()
    {
        args.pause = duration_field(pause, "ramp.pause")?;
    }

    if !is_cli(matches, "max_iterations")
        && let Some(max_iterations) = ramp.max_iterations
    {
        args.max_iterations = PositiveU64::try_from(max_iterations)
            .map_err(|err| invalid_field("ramp.max_iterations", err))?;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn duration_field(value: &DurationValue, field: &'static str) -> AppResult<Duration> {
    value
        .to_duration()
        .map_err(|err| invalid_field(field, err))
}

fn invalid_field(field: &'static str, source: ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}
