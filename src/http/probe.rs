use async_trait::async_trait;
use chrono::Local;
use http::header::{CONNECTION, HOST, HeaderValue, USER_AGENT};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use tokio::time::{Instant, timeout_at};
use tokio_native_tls::TlsConnector;
use tokio_native_tls::native_tls;
use tracing::{debug, warn};

use crate::error::HttpError;
use crate::metrics::{FailureKind, Measurement, PhaseTimings};

use super::connect::{self, Endpoint, Sender};
use super::pool::ConnectionPool;
use super::request::{ProbeConfig, RequestSpec};

/// Executes one request and reports how long each phase took.
///
/// Implementations never fail: transport errors become a failed
/// [`Measurement`] with a [`FailureKind`].
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn execute(&self, request: &RequestSpec) -> Measurement;
}

/// HTTP/1.1 executor that times DNS, connect, TLS and first byte separately.
pub struct HttpProbe {
    config: ProbeConfig,
    tls: TlsConnector,
    user_agent: HeaderValue,
    pool: Option<ConnectionPool>,
}

struct Head {
    response: Response<Incoming>,
    sender: Sender,
    phases: PhaseTimings,
}

impl HttpProbe {
    /// Builds the TLS connector and, in keep-alive mode, the idle pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialized or the
    /// user agent is not a valid header value.
    pub fn new(config: ProbeConfig) -> Result<Self, HttpError> {
        let mut builder = native_tls::TlsConnector::builder();
        if config.insecure {
            builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        let connector = builder
            .build()
            .map_err(|err| HttpError::TlsConnector { source: err })?;
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|err| HttpError::InvalidUserAgent { source: err })?;
        let pool = config
            .keep_alive
            .then(|| ConnectionPool::new(config.max_idle_per_host, config.idle_timeout));

        Ok(Self {
            tls: TlsConnector::from(connector),
            user_agent,
            pool,
            config,
        })
    }

    async fn send_head(
        &self,
        request: &RequestSpec,
        endpoint: &Endpoint,
    ) -> Result<Head, FailureKind> {
        let (mut sender, phases) = self.acquire(endpoint).await?;
        let outgoing = self.build_request(request)?;
        let response = sender.send_request(outgoing).await.map_err(|err| {
            debug!("Request to {} failed: {}", request.url, err);
            if err.is_timeout() {
                FailureKind::Timeout
            } else {
                FailureKind::Other
            }
        })?;
        Ok(Head {
            response,
            sender,
            phases,
        })
    }

    async fn acquire(&self, endpoint: &Endpoint) -> Result<(Sender, PhaseTimings), FailureKind> {
        if let Some(pool) = &self.pool {
            while let Some(mut sender) = pool.checkout(endpoint) {
                if sender.ready().await.is_ok() {
                    debug!("Reusing connection to {}:{}", endpoint.host, endpoint.port);
                    return Ok((sender, PhaseTimings::default()));
                }
            }
        }

        let connected = connect::open(endpoint, &self.tls).await?;
        let mut sender = connected.sender;
        sender.ready().await.map_err(|err| {
            debug!("Connection to {} closed before use: {}", endpoint.host, err);
            FailureKind::Other
        })?;
        Ok((sender, connected.phases))
    }

    fn build_request(&self, request: &RequestSpec) -> Result<Request<Full<Bytes>>, FailureKind> {
        let url = &request.url;
        let mut target = url.path().to_owned();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }

        let body = Full::new(request.body.clone().unwrap_or_default());
        let mut outgoing = Request::builder()
            .method(request.method.clone())
            .uri(target)
            .body(body)
            .map_err(|err| {
                debug!("Invalid request for {}: {}", url, err);
                FailureKind::Other
            })?;

        let headers = outgoing.headers_mut();
        for (name, value) in &request.headers {
            headers.append(name.clone(), value.clone());
        }
        if !headers.contains_key(HOST) {
            let mut host = url.host_str().unwrap_or_default().to_owned();
            if let Some(port) = url.port() {
                host.push(':');
                host.push_str(&port.to_string());
            }
            let value = HeaderValue::from_str(&host).map_err(|err| {
                debug!("Invalid host header '{}': {}", host, err);
                FailureKind::Other
            })?;
            headers.insert(HOST, value);
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, self.user_agent.clone());
        }
        if self.pool.is_none() {
            headers.insert(CONNECTION, HeaderValue::from_static("close"));
        }
        Ok(outgoing)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn execute(&self, request: &RequestSpec) -> Measurement {
        let started_at = Local::now();
        let start = Instant::now();
        let deadline = start
            .checked_add(self.config.request_timeout)
            .unwrap_or(start);

        let failed = |kind: FailureKind| {
            let phases = PhaseTimings {
                total: start.elapsed(),
                ..PhaseTimings::default()
            };
            Measurement::failure(kind, phases).with_started_at(started_at)
        };

        let endpoint = match Endpoint::from_url(&request.url) {
            Ok(endpoint) => endpoint,
            Err(kind) => return failed(kind),
        };

        let head = match timeout_at(deadline, self.send_head(request, &endpoint)).await {
            Ok(Ok(head)) => head,
            Ok(Err(kind)) => return failed(kind),
            Err(_elapsed) => return failed(FailureKind::Timeout),
        };

        let mut phases = head.phases;
        phases.total = start.elapsed();
        let status = status_line(head.response.status());
        let reusable = !closes_connection(&head.response);

        match timeout_at(deadline, drain(head.response.into_body())).await {
            Ok(Ok(())) => {
                if let Some(pool) = &self.pool
                    && reusable
                {
                    pool.checkin(&endpoint, head.sender);
                }
            }
            Ok(Err(err)) => warn!("Failed to drain response body from {}: {}", request.url, err),
            Err(_elapsed) => warn!("Timed out draining response body from {}", request.url),
        }

        Measurement::success(status, phases).with_started_at(started_at)
    }
}

/// `200 OK` style status line; codes without a canonical reason print alone.
pub(crate) fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Reads the body to the end, discarding each frame as it arrives.
async fn drain(mut body: Incoming) -> Result<(), hyper::Error> {
    while let Some(frame) = body.frame().await {
        drop(frame?);
    }
    Ok(())
}

fn closes_connection(response: &Response<Incoming>) -> bool {
    response
        .headers()
        .get(CONNECTION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("close"))
}

#[cfg(test)]
impl HttpProbe {
    pub(super) fn idle_connections(&self, request: &RequestSpec) -> usize {
        if let Some(pool) = &self.pool
            && let Ok(endpoint) = Endpoint::from_url(&request.url)
        {
            return pool.idle_count(&endpoint);
        }
        0
    }
}
