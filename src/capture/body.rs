//! Content-type aware body normalization

use std::collections::BTreeMap;

use crate::{ApiaryError, Result};

/// A buffered body after content-type dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedBody {
    /// Pretty-printed JSON text
    Json(String),
    /// Decoded form fields, values kept verbatim
    Form(BTreeMap<String, String>),
    /// Any other text, read lossily as UTF-8
    Raw(String),
    /// Nothing to store (empty body or multipart payload)
    Unsupported,
}

/// Normalize a buffered body according to its declared content type
///
/// Dispatch is by substring containment over the trimmed content-type value,
/// so parameterised values like `application/json; charset=utf-8` match. An
/// empty body is [`NormalizedBody::Unsupported`] regardless of declared type.
///
/// # Errors
///
/// Returns [`ApiaryError::InvalidJsonBody`] when a body declared as JSON
/// fails to parse.
pub fn normalize(body: &[u8], content_type: Option<&str>) -> Result<NormalizedBody> {
    if body.is_empty() {
        return Ok(NormalizedBody::Unsupported);
    }

    let content_type = content_type.map_or("", str::trim);

    if content_type.contains("application/x-www-form-urlencoded") {
        return Ok(NormalizedBody::Form(parse_form(body)));
    }
    if content_type.contains("application/json") {
        return pretty_print(body, content_type).map(NormalizedBody::Json);
    }
    if content_type.contains("multipart/form-data") {
        return Ok(NormalizedBody::Unsupported);
    }

    Ok(NormalizedBody::Raw(
        String::from_utf8_lossy(body).into_owned(),
    ))
}

/// Re-serialize a JSON body with stable two-space indentation
fn pretty_print(body: &[u8], content_type: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|source| ApiaryError::InvalidJsonBody {
            content_type: content_type.to_string(),
            source,
        })?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Split form-encoded fields, last-wins on duplicates
///
/// Pairs without a `=` or with an empty key are skipped. Values are stored
/// as they appear on the wire, without percent-decoding.
fn parse_form(body: &[u8]) -> BTreeMap<String, String> {
    let text = String::from_utf8_lossy(body);
    let mut fields = BTreeMap::new();
    for pair in text.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        fields.insert(key.to_string(), value.to_string());
    }
    fields
}
