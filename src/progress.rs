//! Progress-callback trait for process lifecycle events.
//!
//! Inject an [`Arc<dyn ProcessProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to receive events
//! as a job is created, fed, polled and downloaded.
//!
//! # Example
//!
//! ```rust
//! use cloudconvert::{ClientConfig, ProcessProgressCallback, ProcessStatus};
//! use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
//!
//! struct PollCounter {
//!     polls: AtomicU64,
//! }
//!
//! impl ProcessProgressCallback for PollCounter {
//!     fn on_poll(&self, attempt: u64, status: &ProcessStatus) {
//!         self.polls.store(attempt, Ordering::SeqCst);
//!         eprintln!("poll {attempt}: {:?}", status.step);
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .progress_callback(Arc::new(PollCounter { polls: AtomicU64::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::status::ProcessStatus;
use std::sync::Arc;

/// Called by [`crate::Process`] at each lifecycle milestone.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` so a config
/// can be shared between tasks.
pub trait ProcessProgressCallback: Send + Sync {
    /// A job URL was assigned by the service.
    fn on_process_created(&self, process_url: &str) {
        let _ = process_url;
    }

    /// Input was accepted (local upload or URL reference).
    fn on_input_submitted(&self, filename: &str) {
        let _ = filename;
    }

    /// A status check returned while waiting. `attempt` is 1-indexed.
    fn on_poll(&self, attempt: u64, status: &ProcessStatus) {
        let _ = (attempt, status);
    }

    /// The job finished and reported an output URL.
    fn on_completed(&self, status: &ProcessStatus) {
        let _ = status;
    }

    /// The output was written to disk.
    fn on_output_saved(&self, bytes_written: u64) {
        let _ = bytes_written;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProcessProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn ProcessProgressCallback>;
