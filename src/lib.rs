//! # cloudconvert
//!
//! Client for the CloudConvert process API.
//!
//! All conversion work happens on the remote service. This crate creates a
//! job ("process"), hands it the input, polls until the job reports a result,
//! and fetches the converted file.
//!
//! ## Lifecycle
//!
//! ```text
//! ApiKey
//!  │
//!  ├─ 1. Create   POST endpoint → dedicated job URL (scheme-normalised)
//!  ├─ 2. Options  local only, merged into the input submission
//!  ├─ 3. Input    multipart upload, or a link the service fetches itself
//!  ├─ 4. Wait     sleep one interval, check `step`, repeat within budget
//!  └─ 5. Output   stream to a file, into memory, or as a byte stream
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloudconvert::{ApiKey, ClientConfig, Process};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = ApiKey::new("your-api-key")?;
//!     let mut process = Process::create("jpg", "png", &key, &ClientConfig::default()).await?;
//!     process.set_option("email", "0");
//!     process.upload("photo.jpg").await?;
//!     process.wait().await?;
//!     process.download("photo.png").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cloudconvert` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cloudconvert = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod credential;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod status;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use convert::{
    convert_file, convert_file_sync, convert_url, format_from_path, Conversion, ConversionSummary,
};
pub use credential::ApiKey;
pub use error::{CloudConvertError, ErrorKind};
pub use process::Process;
pub use progress::{NoopProgressCallback, ProcessProgressCallback, ProgressCallback};
pub use status::{OutputInfo, ProcessStatus, Step};
pub use stream::{output_stream, OutputStream};
