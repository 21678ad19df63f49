//! Input submission payloads.
//!
//! There are two ways to hand the service its input: upload the bytes
//! ourselves (multipart) or give it a link to fetch (plain form). Both start
//! from a fixed set of fields and then merge the caller's options on top, so
//! an option that reuses a reserved key (`format`, `filename`, …) wins.

use crate::error::CloudConvertError;
use reqwest::multipart::{Form, Part};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Name of the multipart part that carries the file bytes.
pub const FILE_FIELD: &str = "file";

/// Fields for an upload of local bytes, before options are merged.
pub fn upload_fields(
    input_format: &str,
    output_format: &str,
    options: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::from([
        ("input".to_string(), "upload".to_string()),
        ("format".to_string(), output_format.to_string()),
        ("filename".to_string(), format!("input.{input_format}")),
    ]);
    merge_options(&mut fields, options);
    fields
}

/// Fields asking the service to download its input from `link`.
pub fn remote_fields(
    link: &str,
    filename: &str,
    output_format: &str,
    options: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::from([
        ("input".to_string(), "download".to_string()),
        ("format".to_string(), output_format.to_string()),
        ("filename".to_string(), filename.to_string()),
        ("link".to_string(), link.to_string()),
    ]);
    merge_options(&mut fields, options);
    fields
}

fn merge_options(fields: &mut BTreeMap<String, String>, options: &BTreeMap<String, String>) {
    fields.extend(options.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// Read the whole input file.
pub async fn read_input(path: &Path) -> Result<Vec<u8>, CloudConvertError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CloudConvertError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Build the multipart body for an upload.
///
/// Every field becomes a text part. The file bytes go in a [`FILE_FIELD`]
/// part named after the `filename` field, unless an option already claimed
/// the `file` key.
pub fn multipart_form(fields: &BTreeMap<String, String>, contents: Vec<u8>) -> Form {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }
    if !fields.contains_key(FILE_FIELD) {
        let filename = fields
            .get("filename")
            .cloned()
            .unwrap_or_else(|| "input".to_string());
        form = form.part(FILE_FIELD, Part::bytes(contents).file_name(filename));
    }
    form
}
