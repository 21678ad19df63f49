//! Output retrieval.
//!
//! Unlike the API calls in [`super::request`], the output URL serves the raw
//! converted file, so nothing here decodes JSON. A non-success status is
//! reported as [`CloudConvertError::DownloadFailed`] rather than written out
//! as if it were the file.

use crate::error::CloudConvertError;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// `GET url` and check the status, leaving the body unread.
pub async fn open_output(
    client: &Client,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Response, CloudConvertError> {
    debug!("GET {} (output)", url);
    let mut request = client.get(url);
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

    if !response.status().is_success() {
        return Err(CloudConvertError::DownloadFailed {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    Ok(response)
}

/// Stream the output at `url` into `target`, returning the bytes written.
///
/// The target is created (or truncated) before the request is sent. If the
/// transfer fails midway the partial file is left where it is.
pub async fn to_file(client: &Client, url: &str, target: &Path) -> Result<u64, CloudConvertError> {
    let write_err = |e: std::io::Error| CloudConvertError::OutputWriteFailed {
        path: target.to_path_buf(),
        source: e,
    };

    let mut file = tokio::fs::File::create(target).await.map_err(write_err)?;
    let response = open_output(client, url, None).await?;

    let mut written: u64 = 0;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| CloudConvertError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        file.write_all(&chunk).await.map_err(write_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;

    info!("Downloaded {} bytes to {}", written, target.display());
    Ok(written)
}

/// Fetch the whole output at `url` into memory.
pub async fn to_memory(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Bytes, CloudConvertError> {
    let response = open_output(client, url, Some(timeout)).await?;
    let body = response
        .bytes()
        .await
        .map_err(|e| CloudConvertError::Transport {
            url: url.to_string(),
            source: e,
        })?;
    debug!("Downloaded {} bytes into memory from {}", body.len(), url);
    Ok(body)
}
