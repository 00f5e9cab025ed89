//! Minimal HTTP/1.1 endpoint for trying the tool locally.
use std::convert::Infallible;

use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::error::HttpError;
use crate::shutdown::ShutdownReceiver;

const GREETING: &str = "Hello, World!";

/// Binds the listener for `serve`.
///
/// # Errors
///
/// Returns an error when the address is in use or not valid.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, HttpError> {
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr)
        .await
        .map_err(|err| HttpError::BindFailed { addr, source: err })
}

/// Accepts connections until the shutdown signal fires.
pub async fn run(listener: TcpListener, mut shutdown_rx: ShutdownReceiver) {
    if let Ok(addr) = listener.local_addr() {
        info!("Serving on http://{}", addr);
    }
    loop {
        tokio::select! {
            () = shutdown_rx.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("Accepted connection from {}", peer);
                    tokio::spawn(serve_connection(stream));
                }
                Err(err) => warn!("Failed to accept connection: {}", err),
            },
        }
    }
    info!("Server stopped");
}

/// Serves every request on one connection with the greeting.
pub(crate) async fn serve_connection(stream: TcpStream) {
    let io = TokioIo::new(stream);
    if let Err(err) = http1::Builder::new()
        .serve_connection(io, service_fn(greet))
        .await
    {
        debug!("Connection ended with error: {}", err);
    }
}

async fn greet(request: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let body = if request.method() == Method::HEAD {
        Bytes::new()
    } else {
        Bytes::from_static(GREETING.as_bytes())
    };
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    Ok(response)
}
