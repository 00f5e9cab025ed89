mod app;
mod config;
mod http;
mod input;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use http::HttpError;
pub use input::{InputError, LineError};
pub use validation::ValidationError;
