use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build TLS connector: {source}")]
    TlsConnector {
        #[source]
        source: tokio_native_tls::native_tls::Error,
    },
    #[error("Invalid user agent: {source}")]
    InvalidUserAgent {
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to '{url}' failed: {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body from '{url}': {source}")]
    ReadBodyFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to bind demo server on {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
