use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::args::{DEFAULT_USER_AGENT, FetchArgs, HttpMethod};
use crate::error::{HttpError, ValidationError};

/// Status, headers and body of a one-shot request, ready for printing.
#[derive(Debug, Clone)]
pub struct OneShotResponse {
    pub url: String,
    pub status: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Builds the client used by `get` and `fetch`.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}

/// Sends a single request and reads the whole body.
///
/// # Errors
///
/// Returns an error when the request fails or the body cannot be read.
pub async fn send(
    client: &Client,
    method: HttpMethod,
    url: &str,
    headers: HeaderMap,
    body: Option<String>,
) -> Result<OneShotResponse, HttpError> {
    let mut builder = client
        .request(http::Method::from(method), url)
        .headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }
    let request = builder
        .build()
        .map_err(|err| HttpError::BuildRequestFailed { source: err })?;

    let response = client
        .execute(request)
        .await
        .map_err(|err| HttpError::RequestFailed {
            url: url.to_owned(),
            source: err,
        })?;

    let status = super::probe::status_line(response.status());
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_owned(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let final_url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|err| HttpError::ReadBodyFailed {
            url: url.to_owned(),
            source: err,
        })?;

    Ok(OneShotResponse {
        url: final_url,
        status,
        headers,
        body,
    })
}

/// Collects the shortcut flags and `-H` pairs of `fetch` into headers.
/// Empty values are skipped.
///
/// # Errors
///
/// Returns an error when a header name or value is not valid HTTP.
pub fn fetch_headers(args: &FetchArgs) -> Result<HeaderMap, ValidationError> {
    let mut headers = HeaderMap::new();
    let bearer = args
        .auth_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .map(|token| format!("Bearer {}", token));

    let shortcuts = [
        (ACCEPT, args.format.as_deref()),
        (USER_AGENT, args.user_agent.as_deref()),
        (AUTHORIZATION, bearer.as_deref()),
        (
            HeaderName::from_static("x-client-version"),
            args.client_version.as_deref(),
        ),
        (HeaderName::from_static("x-api-key"), args.api_key.as_deref()),
        (
            HeaderName::from_static("x-correlation-id"),
            args.correlation_id.as_deref(),
        ),
        (
            HeaderName::from_static("x-custom-header"),
            args.custom_header.as_deref(),
        ),
    ];
    for (name, value) in shortcuts {
        let Some(value) = value.filter(|value| !value.is_empty()) else {
            continue;
        };
        let header_value =
            HeaderValue::from_str(value).map_err(|err| ValidationError::InvalidHeaderValue {
                header: name.as_str().to_owned(),
                source: err,
            })?;
        headers.insert(name, header_value);
    }

    for (key, value) in &args.headers {
        if value.is_empty() {
            continue;
        }
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            ValidationError::InvalidHeaderName {
                header: key.clone(),
                source: err,
            }
        })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|err| ValidationError::InvalidHeaderValue {
                header: key.clone(),
                source: err,
            })?;
        headers.append(name, header_value);
    }
    Ok(headers)
}
