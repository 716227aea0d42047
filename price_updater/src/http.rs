//! Blocking HTTP helpers shared by the quote providers and the identifier sheet.
use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

use crate::error::FetchError;
use price_common::net;

/// Build the client used for every upstream call of a run.
///
/// Every request is bounded by `timeout`; a timed out request surfaces as
/// [`FetchError::Http`].
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(net::USER_AGENT));

    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// GET `url` and return the decoded body.
///
/// A 404 is a clean miss (`Ok(None)`); any other non-success status is an error.
pub fn get_text(client: &Client, url: &str) -> Result<Option<String>, FetchError> {
    debug!("GET {}", url);
    let response = client.get(url).send()?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(Some(response.text()?))
}
