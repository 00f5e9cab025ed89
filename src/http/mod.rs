//! Measured request execution and one-shot requests.
mod connect;
mod oneshot;
mod pool;
mod probe;
mod request;


pub use oneshot::{OneShotResponse, build_client, fetch_headers, send};
pub use probe::{HttpProbe, Probe};
pub use request::{ProbeConfig, RequestSpec, RequestTemplate};
