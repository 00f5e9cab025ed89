//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{
    AddArgs, Cli, Command, CreateArgs, ExecuteArgs, FetchArgs, GetArgs, RampArgs, RemoveArgs,
    RunOptions, ServeArgs, StressArgs,
};
pub use types::{HttpMethod, OutputFormat, PositiveU64, PositiveUsize, StepSequence};

pub(crate) use defaults::{
    DEFAULT_CONFIG_FILES, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    DEFAULT_USER_AGENT,
};
pub(crate) use parsers::{parse_duration, parse_header};
