//! One remote conversion job.
//!
//! A [`Process`] is created against the process endpoint, which assigns it a
//! dedicated job URL. Every later call (input submission, status, cancel,
//! delete) goes to that URL, and the output is fetched from the URL the last
//! status snapshot reports.
//!
//! ```text
//! create ─▶ set_option* ─▶ upload | upload_by_url ─▶ wait | status* ─▶ download
//! ```
//!
//! Nothing is cleaned up automatically: a job that is never deleted expires on
//! the service side, and a failed download leaves its partial file behind.

use crate::config::ClientConfig;
use crate::credential::ApiKey;
use crate::error::CloudConvertError;
use crate::pipeline::poll::PollSchedule;
use crate::pipeline::{download, request, upload};
use crate::progress::ProgressCallback;
use crate::status::ProcessStatus;
use bytes::Bytes;
use reqwest::Client;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A conversion job on the remote service.
///
/// Intended for use by a single caller at a time; every method that talks to
/// the network takes `&mut self` or `&self` and completes one round trip
/// before returning.
#[derive(Debug)]
pub struct Process {
    url: String,
    input_format: String,
    output_format: String,
    options: BTreeMap<String, String>,
    status: Option<ProcessStatus>,
    client: Client,
    config: ClientConfig,
}

impl Process {
    /// Ask the service for a new job converting `input_format` to
    /// `output_format`.
    ///
    /// Conversion options are never sent here; they apply to input
    /// submission only.
    ///
    /// # Errors
    /// A remote error if the request fails, the reply is not JSON, the reply
    /// carries an `error` field, or it has no `url`.
    pub async fn create(
        input_format: impl Into<String>,
        output_format: impl Into<String>,
        api_key: &ApiKey,
        config: &ClientConfig,
    ) -> Result<Self, CloudConvertError> {
        let input_format = input_format.into();
        let output_format = output_format.into();
        let client = config.http_client()?;

        info!(
            "Creating process {} → {} at {}",
            input_format, output_format, config.base_url
        );

        let fields = BTreeMap::from([
            ("inputformat".to_string(), input_format.clone()),
            ("outputformat".to_string(), output_format.clone()),
            ("apikey".to_string(), api_key.as_str().to_string()),
        ]);
        let url =
            request::create_process(&client, &config.base_url, &fields, config.request_timeout)
                .await?;
        info!("Process created: {}", url);

        if let Some(ref cb) = config.progress_callback {
            cb.on_process_created(&url);
        }

        Ok(Self {
            url,
            input_format,
            output_format,
            options: BTreeMap::new(),
            status: None,
            client,
            config: config.clone(),
        })
    }

    /// Set a conversion option forwarded verbatim on every later input
    /// submission, e.g. `("email", "1")` or `("options[audio_bitrate]", "128")`.
    ///
    /// Replaces any earlier value for the same name. Purely local.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.insert(name.into(), value.into());
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    pub fn input_format(&self) -> &str {
        &self.input_format
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    /// The job URL, always with an explicit scheme.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The snapshot from the most recent status call, without a round trip.
    pub fn last_status(&self) -> Option<&ProcessStatus> {
        self.status.as_ref()
    }

    /// Upload a local file as the job's input.
    ///
    /// Sends `input=upload`, `format=<output format>`,
    /// `filename=input.<input format>` and the file bytes, with the current
    /// options merged on top.
    pub async fn upload(&mut self, path: impl AsRef<Path>) -> Result<ProcessStatus, CloudConvertError> {
        let path = path.as_ref();
        let contents = upload::read_input(path).await?;
        info!("Uploading {} to {}", path.display(), self.url);
        self.upload_bytes(contents).await
    }

    /// Upload in-memory bytes as the job's input, exactly as [`Self::upload`]
    /// would send a file with those contents.
    pub async fn upload_bytes(
        &mut self,
        contents: impl Into<Vec<u8>>,
    ) -> Result<ProcessStatus, CloudConvertError> {
        let url = self.require_url()?.to_string();
        let fields = upload::upload_fields(&self.input_format, &self.output_format, &self.options);
        let filename = fields.get("filename").cloned().unwrap_or_default();
        let form = upload::multipart_form(&fields, contents.into());

        let timeout = self.config.request_timeout;
        let reply = request::post_multipart(&self.client, &url, form, timeout).await?;
        debug!("Upload accepted by {}", url);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_input_submitted(&filename);
        }
        Ok(reply)
    }

    /// Let the service fetch the input from `link`.
    ///
    /// `output_format` is taken per call rather than from the process, so the
    /// same job can be asked for a different target format.
    pub async fn upload_by_url(
        &mut self,
        link: &str,
        filename: &str,
        output_format: &str,
    ) -> Result<ProcessStatus, CloudConvertError> {
        let url = self.require_url()?.to_string();
        let fields = upload::remote_fields(link, filename, output_format, &self.options);
        info!("Submitting remote input {} to {}", link, url);

        let timeout = self.config.request_timeout;
        let reply = request::post_form(&self.client, &url, &fields, timeout).await?;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_input_submitted(filename);
        }
        Ok(reply)
    }

    /// Fetch the current job state, replacing the stored snapshot.
    pub async fn status(&mut self) -> Result<&ProcessStatus, CloudConvertError> {
        self.refresh(None).await
    }

    /// Ask the service to cancel the job. Returns the resulting snapshot.
    pub async fn cancel(&mut self) -> Result<&ProcessStatus, CloudConvertError> {
        self.refresh(Some("cancel")).await
    }

    /// Ask the service to delete the job and its files.
    pub async fn delete(&mut self) -> Result<&ProcessStatus, CloudConvertError> {
        self.refresh(Some("delete")).await
    }

    /// [`Self::wait_for_completion`] with the configured budget (120 s by default).
    pub async fn wait(&mut self) -> Result<ProcessStatus, CloudConvertError> {
        let timeout = self.config.wait_timeout;
        self.wait_for_completion(timeout).await
    }

    /// Poll until the job finishes with an output URL, fails, or the budget
    /// runs out.
    ///
    /// Each check is preceded by one poll interval of sleep. The counter of
    /// elapsed intervals may reach the budget and still get one more check,
    /// so at most `ceil(timeout / interval) + 1` status calls are made.
    ///
    /// # Errors
    /// * [`CloudConvertError::ConversionFailed`] the first time a check sees
    ///   `step == "error"`, carrying the service's message.
    /// * [`CloudConvertError::Timeout`] when the budget is spent.
    /// * Any error from [`Self::status`].
    pub async fn wait_for_completion(
        &mut self,
        timeout: Duration,
    ) -> Result<ProcessStatus, CloudConvertError> {
        let schedule = PollSchedule::from_timeout(self.config.poll_interval, timeout);
        let callback: Option<ProgressCallback> = self.config.progress_callback.clone();
        debug!(
            "Waiting for {} (up to {} checks every {:?})",
            self.url,
            schedule.max_checks(),
            schedule.interval
        );

        let mut ticker = schedule.ticker();
        while ticker.tick().await {
            let attempt = ticker.elapsed();
            let status = self.refresh(None).await?;

            if let Some(ref cb) = callback {
                cb.on_poll(attempt, status);
            }

            if status.is_error() {
                let message = status
                    .message
                    .clone()
                    .unwrap_or_else(|| "conversion failed without a message".to_string());
                warn!("Process {} failed: {}", self.url, message);
                return Err(CloudConvertError::ConversionFailed { message });
            }

            if status.is_complete() {
                info!("Process finished after {} checks", attempt);
                if let Some(ref cb) = callback {
                    cb.on_completed(status);
                }
                return Ok(status.clone());
            }
        }

        warn!("Process {} did not finish within {:?}", self.url, timeout);
        Err(CloudConvertError::Timeout {
            waited: timeout,
            polls: ticker.elapsed(),
        })
    }

    /// Write the converted file to `target`, returning the bytes written.
    ///
    /// Requires a prior status call that reported an output URL. The target
    /// is created or truncated; on failure the partial file is left behind.
    pub async fn download(&self, target: impl AsRef<Path>) -> Result<u64, CloudConvertError> {
        let url = self.output_url()?;
        let written = download::to_file(&self.client, &url, target.as_ref()).await?;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_output_saved(written);
        }
        Ok(written)
    }

    /// Fetch the converted file into memory.
    ///
    /// Follows redirects and gives up after the configured download timeout
    /// (30 s by default).
    pub async fn download_to_memory(&self) -> Result<Bytes, CloudConvertError> {
        let url = self.output_url()?;
        download::to_memory(&self.client, &url, self.config.download_timeout).await
    }

    /// Output URL from the last snapshot, with an explicit scheme.
    pub(crate) fn output_url(&self) -> Result<String, CloudConvertError> {
        self.status
            .as_ref()
            .and_then(ProcessStatus::output_url)
            .map(request::normalize_scheme)
            .ok_or(CloudConvertError::OutputNotReady)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    fn require_url(&self) -> Result<&str, CloudConvertError> {
        if self.url.is_empty() {
            return Err(CloudConvertError::MissingProcessUrl);
        }
        Ok(&self.url)
    }

    async fn refresh(&mut self, action: Option<&str>) -> Result<&ProcessStatus, CloudConvertError> {
        let base = self.require_url()?;
        let url = match action {
            Some(a) => format!("{base}/{a}"),
            None => base.to_string(),
        };
        let status = request::get(&self.client, &url, self.config.request_timeout).await?;
        Ok(self.status.insert(status))
    }
}

#[cfg(test)]
impl Process {
    /// A process that skipped the creation round trip.
    pub(crate) fn detached(url: &str, status: Option<ProcessStatus>) -> Self {
        Self {
            url: url.to_string(),
            input_format: "jpg".into(),
            output_format: "png".into(),
            options: BTreeMap::new(),
            status,
            client: Client::new(),
            config: ClientConfig::default(),
        }
    }
}
