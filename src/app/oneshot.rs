use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use reqwest::header::HeaderMap;
use tracing::error;

use crate::args::{FetchArgs, GetArgs, HttpMethod};
use crate::error::AppResult;
use crate::http::{OneShotResponse, build_client, fetch_headers, send};
use crate::targets::normalize_url;

/// Sends `count` GET requests at once and prints every response as it
/// arrives. A failed request is reported and the others continue.
pub(crate) async fn run_get(args: &GetArgs) -> AppResult<()> {
    let client = build_client(args.request_timeout)?;
    let url = normalize_url(&args.url);

    let mut pending: FuturesUnordered<_> = (0..args.count.get())
        .map(|_| send(&client, HttpMethod::Get, &url, HeaderMap::new(), None))
        .collect();
    while let Some(result) = pending.next().await {
        match result {
            Ok(response) => print_response(&response, true),
            Err(err) => error!("{}", err),
        }
    }
    Ok(())
}

/// Sends one request with the header shortcuts applied.
pub(crate) async fn run_fetch(args: &FetchArgs) -> AppResult<()> {
    let client = build_client(args.request_timeout)?;
    let headers = fetch_headers(args)?;
    let url = normalize_url(&args.url);
    match send(&client, args.method, &url, headers, args.data.clone()).await {
        Ok(response) => print_response(&response, false),
        Err(err) => error!("{}", err),
    }
    Ok(())
}

fn print_response(response: &OneShotResponse, with_headers: bool) {
    println!("URL: {}", response.url);
    println!("Status: {}", response.status);
    if with_headers {
        println!("Headers:");
        for (name, value) in &response.headers {
            println!("  {}: {}", name, value);
        }
    }
    println!("Body:");
    println!("{}", response.body);
}
