//! Error types for the cloudconvert client library.
//!
//! Every fallible operation returns [`CloudConvertError`]. The variants are
//! fine-grained so callers can match on exactly what went wrong, while
//! [`CloudConvertError::kind`] folds them into the four broad categories a
//! caller usually branches on:
//!
//! * [`ErrorKind::Remote`]: the transport failed, the service answered with
//!   an `error` field, or the job itself reached the `error` step.
//! * [`ErrorKind::Precondition`]: an operation ran before the state it
//!   needs existed (no job URL, no finished output, bad configuration).
//! * [`ErrorKind::Timeout`]: the completion wait ran out of budget.
//! * [`ErrorKind::LocalIo`]: the input file could not be read or the output
//!   file could not be written.
//!
//! Nothing in the library retries or suppresses an error; every failure is
//! returned to the caller as soon as it is observed.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All errors returned by the cloudconvert library.
#[derive(Debug, Error)]
pub enum CloudConvertError {
    // ── Remote errors ─────────────────────────────────────────────────────
    /// The HTTP request could not be completed (DNS, TLS, connection, timeout).
    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with an `error` field; the message is verbatim.
    #[error("CloudConvert API error: {message}")]
    Api { message: String },

    /// The service answered with something that is not the expected JSON.
    #[error("Invalid response from '{url}' (HTTP {status}): {detail}")]
    InvalidResponse {
        url: String,
        status: u16,
        detail: String,
    },

    /// The job reached the `error` step while polling.
    #[error("Conversion failed: {message}")]
    ConversionFailed { message: String },

    /// The output file URL answered with a non-success status.
    #[error("Failed to download output from '{url}': HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Precondition errors ───────────────────────────────────────────────
    /// An operation that needs the job URL ran before one was assigned.
    #[error("No process URL found (conversion not started)")]
    MissingProcessUrl,

    /// A download ran before a status call reported an output URL.
    #[error("No download URL found (conversion not finished or failed)")]
    OutputNotReady,

    /// Builder or constructor validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Timeout ───────────────────────────────────────────────────────────
    /// The completion wait exhausted its budget.
    #[error("Timed out after {polls} status checks ({waited:?} budget)")]
    Timeout { waited: Duration, polls: u64 },

    // ── Local I/O errors ──────────────────────────────────────────────────
    /// The local input file could not be read.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local output file could not be created or written.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected local failure (e.g. the blocking wrapper's runtime).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad category of a [`CloudConvertError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Remote,
    Precondition,
    Timeout,
    LocalIo,
}

impl CloudConvertError {
    /// Classify the error into one of the four broad categories.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. }
            | Self::Api { .. }
            | Self::InvalidResponse { .. }
            | Self::ConversionFailed { .. }
            | Self::DownloadFailed { .. } => ErrorKind::Remote,
            Self::MissingProcessUrl | Self::OutputNotReady | Self::InvalidConfig(_) => {
                ErrorKind::Precondition
            }
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InputReadFailed { .. } | Self::OutputWriteFailed { .. } | Self::Internal(_) => {
                ErrorKind::LocalIo
            }
        }
    }

    /// The message reported by the service, when there is one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api { message } | Self::ConversionFailed { message } => Some(message),
            _ => None,
        }
    }
}
