//! Request plumbing shared by every API call.
//!
//! The service does not signal failure through HTTP status codes alone: a
//! rejected request usually comes back as a JSON document with an `error`
//! field. So the body is always decoded, whatever the status, and the
//! `error` field is checked first. A body that is not JSON at all is an
//! [`CloudConvertError::InvalidResponse`].
//!
//! The optional API-call timeout is applied per request here, never on the
//! shared client, so output transfers are not bound by it.

use crate::error::CloudConvertError;
use crate::status::ProcessStatus;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Give a URL an explicit scheme.
///
/// The service hands out scheme-relative URLs (`//host/path`); those become
/// `https://host/path`. A bare `host/path` also gets `https://`. URLs that
/// already start with `http://` or `https://` are returned unchanged.
pub fn normalize_scheme(url: &str) -> String {
    if has_http_scheme(url) {
        url.to_string()
    } else if url.starts_with("//") {
        format!("https:{url}")
    } else {
        format!("https://{url}")
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `GET url` and decode the response.
pub async fn get(
    client: &Client,
    url: &str,
    timeout: Option<Duration>,
) -> Result<ProcessStatus, CloudConvertError> {
    debug!("GET {}", url);
    send(client.get(url), url, timeout).await
}

/// `POST url` with an `application/x-www-form-urlencoded` body.
pub async fn post_form(
    client: &Client,
    url: &str,
    fields: &BTreeMap<String, String>,
    timeout: Option<Duration>,
) -> Result<ProcessStatus, CloudConvertError> {
    debug!("POST {} ({} form fields)", url, fields.len());
    send(client.post(url).form(fields), url, timeout).await
}

/// `POST url` with a `multipart/form-data` body.
pub async fn post_multipart(
    client: &Client,
    url: &str,
    form: Form,
    timeout: Option<Duration>,
) -> Result<ProcessStatus, CloudConvertError> {
    debug!("POST {} (multipart)", url);
    send(client.post(url).multipart(form), url, timeout).await
}

/// `POST` the creation form to the process endpoint and return the job URL
/// it hands out, scheme-normalised.
pub async fn create_process(
    client: &Client,
    url: &str,
    fields: &BTreeMap<String, String>,
    timeout: Option<Duration>,
) -> Result<String, CloudConvertError> {
    debug!("POST {} (create process)", url);
    let (status, reply) = send_with_status(client.post(url).form(fields), url, timeout).await?;
    job_url(url, status, &reply)
}

/// The `url` field of a creation reply; `status` is the HTTP status it came with.
pub fn job_url(url: &str, status: u16, reply: &ProcessStatus) -> Result<String, CloudConvertError> {
    match reply.url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => Ok(normalize_scheme(u)),
        _ => Err(CloudConvertError::InvalidResponse {
            url: url.to_string(),
            status,
            detail: "process response has no `url` field".into(),
        }),
    }
}

async fn send(
    request: RequestBuilder,
    url: &str,
    timeout: Option<Duration>,
) -> Result<ProcessStatus, CloudConvertError> {
    send_with_status(request, url, timeout)
        .await
        .map(|(_, reply)| reply)
}

async fn send_with_status(
    mut request: RequestBuilder,
    url: &str,
    timeout: Option<Duration>,
) -> Result<(u16, ProcessStatus), CloudConvertError> {
    if let Some(t) = timeout {
        request = request.timeout(t);
    }
    let response = request
        .send()
        .await
        .map_err(|e| CloudConvertError::Transport {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| CloudConvertError::Transport {
            url: url.to_string(),
            source: e,
        })?;

    decode_response(url, status, &body).map(|reply| (status, reply))
}

/// Decode a response body, surfacing the service's `error` field.
pub fn decode_response(
    url: &str,
    status: u16,
    body: &str,
) -> Result<ProcessStatus, CloudConvertError> {
    let decoded: ProcessStatus =
        serde_json::from_str(body).map_err(|e| CloudConvertError::InvalidResponse {
            url: url.to_string(),
            status,
            detail: format!("{e}; body starts with {:?}", preview(body)),
        })?;

    if let Some(message) = decoded.error.as_ref() {
        warn!("API error from {} (HTTP {}): {}", url, status, message);
        return Err(CloudConvertError::Api {
            message: message.clone(),
        });
    }

    debug!(
        "HTTP {} from {}: step={}",
        status,
        url,
        decoded.step.as_ref().map(|s| s.as_str()).unwrap_or("-")
    );
    Ok(decoded)
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(80) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
