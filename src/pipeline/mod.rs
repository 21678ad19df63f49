//! Building blocks behind [`crate::Process`].
//!
//! Each submodule covers one leg of a job's round trips:
//!
//! ```text
//! create ──▶ upload ──▶ poll ──▶ download
//! (request)  (upload)   (poll)   (download)
//! ```
//!
//! 1. [`request`]  — send a call, decode the JSON reply, surface `error`,
//!    normalise scheme-relative URLs
//! 2. [`upload`]   — field sets and the multipart payload for input submission
//! 3. [`poll`]     — fixed-interval tick budget used while waiting
//! 4. [`download`] — fetch the converted file to disk or memory

pub mod download;
pub mod poll;
pub mod request;
pub mod upload;
