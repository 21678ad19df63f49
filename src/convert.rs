//! One-shot conversion entry points.
//!
//! These drive a whole [`Process`] lifecycle in one call: create the job,
//! apply options, submit the input, wait, and save the output. Use
//! [`Process`] directly when you need to inspect status between steps,
//! cancel a job, or keep the output in memory.

use crate::config::ClientConfig;
use crate::credential::ApiKey;
use crate::error::CloudConvertError;
use crate::process::Process;
use crate::status::ProcessStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// What to convert into what, plus vendor options.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    pub input_format: String,
    pub output_format: String,
    pub options: BTreeMap<String, String>,
}

impl Conversion {
    pub fn new(input_format: impl Into<String>, output_format: impl Into<String>) -> Self {
        Self {
            input_format: input_format.into(),
            output_format: output_format.into(),
            options: BTreeMap::new(),
        }
    }

    /// Add a vendor option; a repeated name replaces the earlier value.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    async fn start(
        &self,
        api_key: &ApiKey,
        config: &ClientConfig,
    ) -> Result<Process, CloudConvertError> {
        let mut process =
            Process::create(&self.input_format, &self.output_format, api_key, config).await?;
        for (name, value) in &self.options {
            process.set_option(name, value);
        }
        Ok(process)
    }
}

/// Outcome of a one-shot conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    /// Job URL, useful for support requests or a later delete.
    pub process_url: String,
    pub output_path: PathBuf,
    pub bytes_written: u64,
    /// The snapshot that reported completion.
    pub status: ProcessStatus,
    pub duration_ms: u64,
}

/// Lower-cased file extension of `path`, usable as a format tag.
pub fn format_from_path(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Upload a local file, wait for the job, and save the result to `output`.
///
/// # Example
/// ```rust,no_run
/// use cloudconvert::{convert_file, ApiKey, ClientConfig, Conversion};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key = ApiKey::new("your-api-key")?;
/// let job = Conversion::new("jpg", "png").option("email", "0");
/// let summary = convert_file(&job, "photo.jpg", "photo.png", &key, &ClientConfig::default()).await?;
/// println!("{} bytes from {}", summary.bytes_written, summary.process_url);
/// # Ok(())
/// # }
/// ```
pub async fn convert_file(
    conversion: &Conversion,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    api_key: &ApiKey,
    config: &ClientConfig,
) -> Result<ConversionSummary, CloudConvertError> {
    let start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    let mut process = conversion.start(api_key, config).await?;
    process.upload(input).await?;
    finish(process, output.as_ref(), start).await
}

/// Let the service fetch `link`, wait for the job, and save the result.
pub async fn convert_url(
    conversion: &Conversion,
    link: &str,
    filename: &str,
    output: impl AsRef<Path>,
    api_key: &ApiKey,
    config: &ClientConfig,
) -> Result<ConversionSummary, CloudConvertError> {
    let start = Instant::now();
    info!("Starting conversion: {}", link);

    let mut process = conversion.start(api_key, config).await?;
    process
        .upload_by_url(link, filename, &conversion.output_format)
        .await?;
    finish(process, output.as_ref(), start).await
}

/// Synchronous wrapper around [`convert_file`].
///
/// Creates a temporary tokio runtime internally; do not call it from inside
/// an async context.
pub fn convert_file_sync(
    conversion: &Conversion,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    api_key: &ApiKey,
    config: &ClientConfig,
) -> Result<ConversionSummary, CloudConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CloudConvertError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert_file(conversion, input, output, api_key, config))
}

async fn finish(
    mut process: Process,
    output: &Path,
    start: Instant,
) -> Result<ConversionSummary, CloudConvertError> {
    let status = process.wait().await?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CloudConvertError::OutputWriteFailed {
                path: output.to_path_buf(),
                source: e,
            })?;
    }
    let bytes_written = process.download(output).await?;

    let summary = ConversionSummary {
        process_url: process.url().to_string(),
        output_path: output.to_path_buf(),
        bytes_written,
        status,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} bytes in {}ms",
        summary.bytes_written, summary.duration_ms
    );
    Ok(summary)
}
