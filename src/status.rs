//! Typed view of the JSON documents the process API returns.
//!
//! The service returns the same shape from process creation, status, cancel
//! and delete calls. Only a handful of fields drive client behaviour (`url`,
//! `step`, `message`, `error`, `output.url`); they are named here as optional
//! fields, and everything else is kept verbatim in `extra` so callers can
//! still reach vendor fields this crate does not model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Job progress as reported in the `step` field.
///
/// Only two values carry meaning for the client; every other value means
/// the job is still in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Step {
    /// The job failed; `message` explains why.
    Error,
    /// The job finished; `output.url` points at the result.
    Finished,
    /// Any other server-defined step (`input`, `wait`, `convert`, `output`, …).
    Other(String),
}

impl Step {
    pub fn as_str(&self) -> &str {
        match self {
            Step::Error => "error",
            Step::Finished => "finished",
            Step::Other(s) => s,
        }
    }
}

impl From<String> for Step {
    fn from(s: String) -> Self {
        match s.as_str() {
            "error" => Step::Error,
            "finished" => Step::Finished,
            _ => Step::Other(s),
        }
    }
}

impl From<Step> for String {
    fn from(step: Step) -> Self {
        match step {
            Step::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `output` object of a status snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputInfo {
    /// Download URL of the converted file; may be scheme-relative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A decoded response from the process API.
///
/// Held by [`crate::Process`] as the last known remote state. Each status
/// call replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStatus {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub id: Option<String>,

    /// Job URL; present on the creation response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Current step; a non-string value counts as an in-progress step.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_step")]
    pub step: Option<Step>,

    /// Human-readable description of the current step or failure.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub message: Option<String>,

    /// Completion percentage; the service sends either a number or a string.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_percent")]
    pub percent: Option<f64>,

    /// Set when the request itself was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputInfo>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProcessStatus {
    pub fn is_finished(&self) -> bool {
        self.step == Some(Step::Finished)
    }

    pub fn is_error(&self) -> bool {
        self.step == Some(Step::Error)
    }

    /// The output URL as sent by the service, if present and non-empty.
    pub fn output_url(&self) -> Option<&str> {
        self.output
            .as_ref()
            .and_then(|o| o.url.as_deref())
            .filter(|u| !u.is_empty())
    }

    /// Finished with a usable output URL.
    pub fn is_complete(&self) -> bool {
        self.is_finished() && self.output_url().is_some()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn lenient_step<'de, D>(deserializer: D) -> Result<Option<Step>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.map(Step::from))
}

fn lenient_percent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
