//! Client configuration.
//!
//! All tunable behaviour lives in [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The defaults match the hosted service: the
//! public process endpoint, a one-second poll interval and a 120-second
//! completion budget.

use crate::error::CloudConvertError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Public endpoint that hands out per-job process URLs.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudconvert.com/process";

/// Configuration shared by every [`crate::Process`].
///
/// # Example
/// ```rust
/// use cloudconvert::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .wait_timeout(Duration::from_secs(300))
///     .build()
///     .unwrap();
/// assert_eq!(config.poll_interval, Duration::from_secs(1));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Process-creation endpoint. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Delay before every status check while waiting. Default: 1 s.
    pub poll_interval: Duration,

    /// Budget for [`crate::Process::wait`]. Default: 120 s.
    ///
    /// The wait counts whole poll intervals and performs one more check when
    /// the counter reaches the budget, so up to `budget / interval + 1`
    /// status calls are made.
    pub wait_timeout: Duration,

    /// Transport timeout for in-memory output downloads. Default: 30 s.
    pub download_timeout: Duration,

    /// Transport timeout for each API call (create, upload, status, cancel,
    /// delete). Output downloads are not bound by it. Default: none.
    pub request_timeout: Option<Duration>,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Optional lifecycle observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(1),
            wait_timeout: Duration::from_secs(120),
            download_timeout: Duration::from_secs(30),
            request_timeout: None,
            user_agent: concat!("cloudconvert-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("poll_interval", &self.poll_interval)
            .field("wait_timeout", &self.wait_timeout)
            .field("download_timeout", &self.download_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ProcessProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build the HTTP client shared by API calls and output downloads.
    ///
    /// Carries no overall timeout; `request_timeout` and `download_timeout`
    /// are applied per request.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, CloudConvertError> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| CloudConvertError::Transport {
                url: self.base_url.clone(),
                source: e,
            })
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = timeout;
        self
    }

    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, CloudConvertError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(CloudConvertError::InvalidConfig(
                "base URL must not be empty".into(),
            ));
        }
        if c.poll_interval < Duration::from_millis(1) {
            return Err(CloudConvertError::InvalidConfig(format!(
                "poll interval must be at least 1ms, got {:?}",
                c.poll_interval
            )));
        }
        if c.download_timeout.is_zero() {
            return Err(CloudConvertError::InvalidConfig(
                "download timeout must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}
