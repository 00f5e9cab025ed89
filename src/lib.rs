//! Core library for the `hpstress` CLI.
//!
//! The building blocks behind the binary: a measured HTTP executor that
//! records DNS, connect, TLS and total time per request, order-independent
//! aggregation, a bounded worker pool, an adaptive ramp search for the
//! largest load that fits a time budget, and a batch runner over target
//! files.
pub mod app;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod load;
pub mod logger;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod targets;
