use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use hyper::body::Bytes;
use url::Url;

use crate::args::{
    DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST, DEFAULT_USER_AGENT, HttpMethod,
};
use crate::error::ValidationError;

/// Everything needed to send one measured request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: http::Method,
    pub url: Url,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Option<Bytes>,
}

impl RequestSpec {
    #[must_use]
    pub fn new(method: HttpMethod, url: Url) -> Self {
        RequestTemplate::new(method).request_for(url)
    }
}

/// Method, headers and body shared by every request of a run; only the URL
/// varies per target.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    pub method: http::Method,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Option<Bytes>,
}

impl RequestTemplate {
    #[must_use]
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method: method.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds `Key: Value` pairs as request headers.
    ///
    /// # Errors
    ///
    /// Returns an error when a header name or value is not valid HTTP.
    pub fn with_headers(mut self, headers: &[(String, String)]) -> Result<Self, ValidationError> {
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
                ValidationError::InvalidHeaderName {
                    header: key.clone(),
                    source: err,
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|err| {
                ValidationError::InvalidHeaderValue {
                    header: key.clone(),
                    source: err,
                }
            })?;
            self.headers.push((name, header_value));
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body.map(Bytes::from);
        self
    }

    #[must_use]
    pub fn request_for(&self, url: Url) -> RequestSpec {
        RequestSpec {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

/// Transport settings of the measured executor.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Bounds the whole request, body drain included.
    pub request_timeout: Duration,
    /// Reuse idle connections instead of opening one per request.
    pub keep_alive: bool,
    /// Accept invalid certificates and hostnames.
    pub insecure: bool,
    pub user_agent: String,
    pub max_idle_per_host: usize,
    pub idle_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            keep_alive: false,
            insecure: false,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
        }
    }
}
