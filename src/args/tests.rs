use super::*;
use crate::error::{AppError, AppResult, ValidationError};
use clap::Parser;
use std::time::Duration;

fn parse_test_args<I, T>(args: I) -> AppResult<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(AppError::from)
}

#[test]
fn stress_defaults() -> AppResult<()> {
    let cli = parse_test_args(["hpstress", "stress", "example.com"])?;
    let Command::Stress(args) = cli.command else {
        return Err(AppError::validation("Expected stress subcommand"));
    };

    let checks = [
        (args.url == "example.com", "Unexpected url"),
        (args.count.get() == 1, "Unexpected default count"),
        (args.run.workers.get() == 5, "Unexpected default workers"),
        (!args.run.show_requests, "Expected show_requests to be false"),
        (
            matches!(args.run.method, HttpMethod::Get),
            "Expected HttpMethod::Get",
        ),
        (args.run.headers.is_empty(), "Expected no headers"),
        (args.run.data.is_none(), "Expected no body"),
        (
            args.run.request_timeout == Duration::from_secs(10),
            "Unexpected request_timeout",
        ),
        (!args.run.keep_alive, "Expected cold connections by default"),
        (!args.run.insecure, "Expected secure TLS by default"),
        (args.run.deadline.is_none(), "Expected no deadline"),
        (
            matches!(args.run.output_format, OutputFormat::Text),
            "Expected text output",
        ),
        (cli.targets_dir == "executable", "Unexpected targets_dir"),
        (!cli.verbose, "Expected verbose to be false"),
        (cli.config.is_none(), "Expected no config path"),
    ];

    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn stress_accepts_count_and_concurrency_alias() -> AppResult<()> {
    let cli = parse_test_args([
        "hpstress",
        "stress",
        "http://localhost:8080",
        "200",
        "--concurrency",
        "12",
        "-s",
        "-H",
        "X-Test: yes",
        "--keep-alive",
        "--timeout",
        "250ms",
    ])?;
    let Command::Stress(args) = cli.command else {
        return Err(AppError::validation("Expected stress subcommand"));
    };
    if args.count.get() != 200 {
        return Err(AppError::validation("Unexpected count"));
    }
    if args.run.workers.get() != 12 {
        return Err(AppError::validation("Unexpected workers"));
    }
    if !args.run.show_requests || !args.run.keep_alive {
        return Err(AppError::validation("Expected flags to be set"));
    }
    if args.run.headers != vec![("X-Test".to_owned(), "yes".to_owned())] {
        return Err(AppError::validation("Unexpected headers"));
    }
    if args.run.request_timeout != Duration::from_millis(250) {
        return Err(AppError::validation("Unexpected request_timeout"));
    }
    Ok(())
}

#[test]
fn stress_rejects_zero_count_and_workers() -> AppResult<()> {
    if parse_test_args(["hpstress", "stress", "localhost", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero count to be rejected"));
    }
    if parse_test_args(["hpstress", "stress", "localhost", "-w", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero workers to be rejected"));
    }
    Ok(())
}

#[test]
fn ramp_defaults() -> AppResult<()> {
    let cli = parse_test_args(["hpstress", "ramp", "localhost"])?;
    let Command::Ramp(args) = cli.command else {
        return Err(AppError::validation("Expected ramp subcommand"));
    };
    if args.time_budget != Duration::from_millis(1) {
        return Err(AppError::validation("Unexpected time_budget"));
    }
    if args.steps.as_slice() != [100, 50, 10, 5, 1] {
        return Err(AppError::validation("Unexpected steps"));
    }
    if args.pause != Duration::from_secs(1) {
        return Err(AppError::validation("Unexpected pause"));
    }
    if args.max_iterations.get() != 100 {
        return Err(AppError::validation("Unexpected max_iterations"));
    }
    Ok(())
}

#[test]
fn ramp_parses_budget_alias_and_custom_steps() -> AppResult<()> {
    let cli = parse_test_args([
        "hpstress",
        "ramp",
        "localhost",
        "--max-time",
        "2s",
        "--steps",
        "20, 5,1",
        "--pause",
        "10ms",
    ])?;
    let Command::Ramp(args) = cli.command else {
        return Err(AppError::validation("Expected ramp subcommand"));
    };
    if args.time_budget != Duration::from_secs(2) {
        return Err(AppError::validation("Unexpected time_budget"));
    }
    if args.steps.as_slice() != [20, 5, 1] {
        return Err(AppError::validation("Unexpected steps"));
    }
    if args.pause != Duration::from_millis(10) {
        return Err(AppError::validation("Unexpected pause"));
    }
    Ok(())
}

#[test]
fn step_sequence_rejects_invalid_input() -> AppResult<()> {
    let cases = ["", "10,0,1", "1,5,10", "10,abc"];
    for case in cases {
        if case.parse::<StepSequence>().is_ok() {
            return Err(AppError::validation(ValidationError::TestExpectationValue {
                message: "Expected step sequence to be rejected",
                value: case.to_owned(),
            }));
        }
    }
    let equal = "10,10,1".parse::<StepSequence>()?;
    if equal.to_string() != "10,10,1" {
        return Err(AppError::validation("Unexpected step sequence display"));
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("150ms", Duration::from_millis(150)),
        ("3", Duration::from_secs(3)),
        ("3s", Duration::from_secs(3)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        if parse_duration(input)? != expected {
            return Err(AppError::validation(ValidationError::TestExpectationValue {
                message: "Unexpected duration",
                value: input.to_owned(),
            }));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_rejects_bad_values() -> AppResult<()> {
    let checks = [
        (
            matches!(parse_duration(""), Err(ValidationError::DurationEmpty)),
            "Expected DurationEmpty",
        ),
        (
            matches!(parse_duration("0ms"), Err(ValidationError::DurationZero)),
            "Expected DurationZero",
        ),
        (
            matches!(
                parse_duration("5d"),
                Err(ValidationError::InvalidDurationUnit { .. })
            ),
            "Expected InvalidDurationUnit",
        ),
        (
            matches!(
                parse_duration("ms"),
                Err(ValidationError::InvalidDurationFormat { .. })
            ),
            "Expected InvalidDurationFormat",
        ),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn parse_header_trims_key_and_value() -> AppResult<()> {
    let (key, value) = parse_header("  Accept :  application/json ")?;
    if key != "Accept" || value != "application/json" {
        return Err(AppError::validation("Unexpected header split"));
    }
    if parse_header("no-colon").is_ok() {
        return Err(AppError::validation("Expected header without colon to fail"));
    }
    Ok(())
}

#[test]
fn add_defaults_count_to_one() -> AppResult<()> {
    let cli = parse_test_args([
        "hpstress",
        "--targets-dir",
        "/tmp/targets",
        "add",
        "smoke",
        "example.com",
    ])?;
    let Command::Add(args) = cli.command else {
        return Err(AppError::validation("Expected add subcommand"));
    };
    if args.file != "smoke" || args.url != "example.com" || args.count.get() != 1 {
        return Err(AppError::validation("Unexpected add arguments"));
    }
    if cli.targets_dir != "/tmp/targets" {
        return Err(AppError::validation("Unexpected targets_dir"));
    }
    Ok(())
}

#[test]
fn fetch_header_shortcuts() -> AppResult<()> {
    let cli = parse_test_args([
        "hpstress",
        "fetch",
        "localhost",
        "-f",
        "application/json",
        "-a",
        "secret",
        "--api-key",
        "key",
        "-X",
        "POST",
        "-d",
        "{}",
    ])?;
    let Command::Fetch(args) = cli.command else {
        return Err(AppError::validation("Expected fetch subcommand"));
    };
    let checks = [
        (
            args.format.as_deref() == Some("application/json"),
            "Unexpected format",
        ),
        (args.auth_token.as_deref() == Some("secret"), "Unexpected auth"),
        (args.api_key.as_deref() == Some("key"), "Unexpected api key"),
        (
            matches!(args.method, HttpMethod::Post),
            "Expected HttpMethod::Post",
        ),
        (args.data.as_deref() == Some("{}"), "Unexpected body"),
        (args.correlation_id.is_none(), "Expected no correlation id"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn serve_defaults() -> AppResult<()> {
    let cli = parse_test_args(["hpstress", "serve"])?;
    let Command::Serve(args) = cli.command else {
        return Err(AppError::validation("Expected serve subcommand"));
    };
    if args.bind != "127.0.0.1" || args.port != 8080 {
        return Err(AppError::validation("Unexpected serve defaults"));
    }
    Ok(())
}
