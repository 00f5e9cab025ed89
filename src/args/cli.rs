use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::DEFAULT_TARGETS_DIR;
use super::parsers::{
    parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize,
    parse_step_sequence,
};
use super::types::{HttpMethod, OutputFormat, PositiveU64, PositiveUsize, StepSequence};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load-measurement CLI: per-phase timings, bounded worker pools, batch targets and adaptive ramp search."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file (TOML or JSON). Defaults to ./hpstress.toml or ./hpstress.json
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Directory holding target files
    #[arg(long = "targets-dir", global = true, default_value = DEFAULT_TARGETS_DIR)]
    pub targets_dir: String,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Stress test a URL with a bounded worker pool
    Stress(StressArgs),
    /// Search for the highest request volume that completes within a time budget
    Ramp(RampArgs),
    /// Run every target of a target file concurrently
    Execute(ExecuteArgs),
    /// Create an empty target file
    Create(CreateArgs),
    /// Append a '<url> <count>' line to a target file
    Add(AddArgs),
    /// Delete a target file
    Remove(RemoveArgs),
    /// Send GET requests and print status, headers and body
    Get(GetArgs),
    /// Send a single request with custom headers
    Fetch(FetchArgs),
    /// Start a demo HTTP endpoint
    Serve(ServeArgs),
}

/// Options shared by every measured run (stress, ramp, execute).
#[derive(Debug, Args, Clone)]
pub struct RunOptions {
    /// Maximum number of requests in flight
    #[arg(
        long = "workers",
        short = 'w',
        alias = "concurrency",
        default_value = "5",
        value_parser = parse_positive_usize
    )]
    pub workers: PositiveUsize,

    /// Print a line for every completed request
    #[arg(long = "show-requests", short = 's')]
    pub show_requests: bool,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Reuse pooled keep-alive connections instead of a fresh connection per request
    #[arg(long = "keep-alive")]
    pub keep_alive: bool,

    /// Accept invalid TLS certificates and hostnames
    #[arg(long)]
    pub insecure: bool,

    /// Cancel the run after this long (supports ms/s/m/h)
    #[arg(long, value_parser = parse_duration_arg)]
    pub deadline: Option<Duration>,

    /// Summary output format
    #[arg(long = "output-format", default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct StressArgs {
    /// Target URL (http:// is assumed when no scheme is given)
    pub url: String,

    /// Number of requests to send
    #[arg(default_value = "1", value_parser = parse_positive_u64)]
    pub count: PositiveU64,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Args, Clone)]
pub struct RampArgs {
    /// Target URL (http:// is assumed when no scheme is given)
    pub url: String,

    /// Wall-clock budget for one batch (supports ms/s/m/h)
    #[arg(
        long = "time-budget",
        short = 't',
        alias = "max-time",
        default_value = "1ms",
        value_parser = parse_duration_arg
    )]
    pub time_budget: Duration,

    /// Load increments, coarse to fine
    #[arg(long, default_value = "100,50,10,5,1", value_parser = parse_step_sequence)]
    pub steps: StepSequence,

    /// Pause between batches (supports ms/s/m/h)
    #[arg(long, default_value = "1s", value_parser = parse_duration_arg)]
    pub pause: Duration,

    /// Stop after this many batches even if the budget was never exceeded
    #[arg(long = "max-iterations", default_value = "100", value_parser = parse_positive_u64)]
    pub max_iterations: PositiveU64,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Args, Clone)]
pub struct ExecuteArgs {
    /// Target file name inside the targets directory (.txt is optional)
    pub file: String,

    #[command(flatten)]
    pub run: RunOptions,
}

#[derive(Debug, Args, Clone)]
pub struct CreateArgs {
    /// Target file name (.txt is optional)
    pub file: String,
}

#[derive(Debug, Args, Clone)]
pub struct AddArgs {
    /// Target file name (.txt is optional)
    pub file: String,

    /// Target URL
    pub url: String,

    /// Number of requests for this target
    #[arg(default_value = "1", value_parser = parse_positive_u64)]
    pub count: PositiveU64,
}

#[derive(Debug, Args, Clone)]
pub struct RemoveArgs {
    /// Target file name (.txt is optional)
    pub file: String,
}

#[derive(Debug, Args, Clone)]
pub struct GetArgs {
    /// Target URL (http:// is assumed when no scheme is given)
    pub url: String,

    /// Number of concurrent requests
    #[arg(default_value = "1", value_parser = parse_positive_u64)]
    pub count: PositiveU64,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Target URL (http:// is assumed when no scheme is given)
    pub url: String,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Accept header (requested content type)
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// User-Agent header
    #[arg(long = "user-agent", short = 'u')]
    pub user_agent: Option<String>,

    /// Bearer token sent as 'Authorization: Bearer <token>'
    #[arg(long = "auth-token", short = 'a')]
    pub auth_token: Option<String>,

    /// X-Client-Version header
    #[arg(long = "client-version")]
    pub client_version: Option<String>,

    /// X-Api-Key header
    #[arg(long = "api-key", short = 'k')]
    pub api_key: Option<String>,

    /// X-Correlation-ID header
    #[arg(long = "correlation-id", short = 'c')]
    pub correlation_id: Option<String>,

    /// X-Custom-Header header
    #[arg(long = "custom-header")]
    pub custom_header: Option<String>,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,
}
