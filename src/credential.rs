//! API credential holder.

use crate::error::CloudConvertError;
use std::fmt;

/// An opaque CloudConvert API key.
///
/// The key format is not checked locally; the service rejects bad keys.
/// `Debug` and `Display` never print the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key. Fails only when the key is empty or whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, CloudConvertError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(CloudConvertError::InvalidConfig(
                "API key must not be empty".into(),
            ));
        }
        Ok(Self(key))
    }

    /// The key exactly as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&"<redacted>").finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
