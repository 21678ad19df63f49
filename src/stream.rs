//! Streaming output retrieval.
//!
//! [`crate::Process::download_to_memory`] buffers the whole file, and
//! [`crate::Process::download`] always lands on disk. [`output_stream`] sits
//! between the two: it yields the body chunk by chunk so callers can pipe a
//! large result into a socket, a hasher or an upload of their own without
//! holding it all in memory.

use crate::error::CloudConvertError;
use crate::pipeline::download;
use crate::process::Process;
use bytes::Bytes;
use futures::stream::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of output chunks.
pub type OutputStream = Pin<Box<dyn Stream<Item = Result<Bytes, CloudConvertError>> + Send>>;

/// Open the converted output of `process` as a byte stream.
///
/// Same precondition as a download: the last status snapshot must report an
/// output URL. The request is sent and its status checked before this
/// returns; transport failures midway surface as stream items.
///
/// # Example
/// ```rust,no_run
/// use cloudconvert::{output_stream, ApiKey, ClientConfig, Process};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key = ApiKey::new("your-api-key")?;
/// let mut process = Process::create("jpg", "png", &key, &ClientConfig::default()).await?;
/// process.upload("photo.jpg").await?;
/// process.wait().await?;
///
/// let mut chunks = output_stream(&process).await?;
/// let mut total = 0;
/// while let Some(chunk) = chunks.next().await {
///     total += chunk?.len();
/// }
/// println!("{total} bytes");
/// # Ok(())
/// # }
/// ```
pub async fn output_stream(process: &Process) -> Result<OutputStream, CloudConvertError> {
    let url = process.output_url()?;
    info!("Streaming output from {}", url);

    let response = download::open_output(process.client(), &url, None).await?;
    let s = response.bytes_stream().map(move |chunk| {
        chunk.map_err(|e| CloudConvertError::Transport {
            url: url.clone(),
            source: e,
        })
    });

    Ok(Box::pin(s))
}
