use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::Instant;
use tokio_native_tls::TlsConnector;
use tracing::debug;
use url::{Host, Url};

use crate::metrics::{FailureKind, PhaseTimings};

pub(super) type Sender = SendRequest<Full<Bytes>>;

/// A fresh HTTP/1.1 connection plus the time its setup phases took.
pub(super) struct Connected {
    pub(super) sender: Sender,
    pub(super) phases: PhaseTimings,
}

/// Where a connection goes, independent of the request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Endpoint {
    pub(crate) secure: bool,
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl Endpoint {
    pub(crate) fn from_url(url: &Url) -> Result<Self, FailureKind> {
        let secure = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                debug!("Unsupported scheme '{}' in {}", other, url);
                return Err(FailureKind::Other);
            }
        };
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_owned(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(FailureKind::Other),
        };
        let port = url.port_or_known_default().ok_or(FailureKind::Other)?;
        Ok(Self { secure, host, port })
    }
}

/// Resolves, connects, optionally negotiates TLS and performs the HTTP/1.1
/// handshake, timing each phase.
pub(super) async fn open(
    endpoint: &Endpoint,
    tls: &TlsConnector,
) -> Result<Connected, FailureKind> {
    let mut phases = PhaseTimings::default();

    let (addrs, dns) = resolve(endpoint).await?;
    phases.dns = dns;

    let connect_start = Instant::now();
    let tcp = connect_any(&addrs).await?;
    phases.connect = connect_start.elapsed();
    if let Err(err) = tcp.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY: {}", err);
    }

    let sender = if endpoint.secure {
        let tls_start = Instant::now();
        let stream = tls.connect(&endpoint.host, tcp).await.map_err(|err| {
            debug!("TLS handshake with {} failed: {}", endpoint.host, err);
            FailureKind::Tls
        })?;
        phases.tls = tls_start.elapsed();
        handshake(stream).await?
    } else {
        handshake(tcp).await?
    };

    Ok(Connected { sender, phases })
}

/// Resolves the endpoint and reports how long the lookup took. IP literals
/// skip the lookup and report zero.
async fn resolve(endpoint: &Endpoint) -> Result<(Vec<SocketAddr>, Duration), FailureKind> {
    if let Ok(ip) = endpoint.host.parse::<IpAddr>() {
        return Ok((vec![SocketAddr::new(ip, endpoint.port)], Duration::ZERO));
    }
    let dns_start = Instant::now();
    let addrs: Vec<SocketAddr> = lookup_host((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|err| {
            debug!("DNS lookup for {} failed: {}", endpoint.host, err);
            FailureKind::Dns
        })?
        .collect();
    if addrs.is_empty() {
        debug!("DNS lookup for {} returned no addresses", endpoint.host);
        return Err(FailureKind::Dns);
    }
    Ok((addrs, dns_start.elapsed()))
}

async fn connect_any(addrs: &[SocketAddr]) -> Result<TcpStream, FailureKind> {
    let mut last_error: Option<io::Error> = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => last_error = Some(err),
        }
    }
    if let Some(err) = last_error {
        debug!("TCP connect failed: {}", err);
    }
    Err(FailureKind::Connect)
}

async fn handshake<T>(io: T) -> Result<Sender, FailureKind>
where
    T: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (sender, connection) = http1::handshake(TokioIo::new(io)).await.map_err(|err| {
        debug!("HTTP handshake failed: {}", err);
        FailureKind::Other
    })?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            debug!("Connection closed with error: {}", err);
        }
    });
    Ok(sender)
}
