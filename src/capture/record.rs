//! Captured exchange records and their extraction

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use hyper::http::request::Parts;
use hyper::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capture::body::{normalize, NormalizedBody};
use crate::capture::headers;
use crate::config::FailurePolicy;
use crate::Result;

/// Request half of a captured exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPart {
    /// HTTP method, verbatim
    #[serde(rename = "request_method")]
    pub method: String,
    /// Request path with the query stripped
    #[serde(rename = "request_path")]
    pub path: String,
    /// Flattened headers surviving suppression
    #[serde(rename = "request_headers")]
    pub headers: BTreeMap<String, String>,
    /// Header names excluded from capture
    #[serde(rename = "request_suppressed_headers")]
    pub suppressed_headers: BTreeSet<String>,
    /// Query parameters in canonical percent-encoding
    #[serde(rename = "request_url_params")]
    pub url_params: BTreeMap<String, String>,
    /// Form fields, populated only for form-encoded bodies
    #[serde(rename = "request_post_forms")]
    pub post_forms: BTreeMap<String, String>,
    /// Pretty-printed JSON body, empty for other encodings
    #[serde(rename = "request_body")]
    pub body: String,
}

/// Response half of a captured exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePart {
    /// Flattened headers surviving suppression
    #[serde(rename = "response_headers")]
    pub headers: BTreeMap<String, String>,
    /// Header names excluded from capture
    #[serde(rename = "response_suppressed_headers")]
    pub suppressed_headers: BTreeSet<String>,
    /// HTTP status code
    #[serde(rename = "response_status_code")]
    pub status_code: u16,
    /// Pretty-printed JSON body, raw text for other encodings
    #[serde(rename = "response_body")]
    pub body: String,
}

/// One captured request/response exchange
///
/// Serializes as a single flat object so the snapshot reads as one row per
/// endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Request half
    #[serde(flatten)]
    pub request: RequestPart,
    /// Response half
    #[serde(flatten)]
    pub response: ResponsePart,
}

impl Record {
    /// Assemble a record from its two captured halves
    #[must_use]
    pub fn new(request: RequestPart, response: ResponsePart) -> Self {
        Self { request, response }
    }

    /// Whether two records document the same endpoint
    ///
    /// Identity is the (method, path, status code) triple; headers, bodies
    /// and parameters do not participate.
    #[must_use]
    pub fn same_endpoint(&self, other: &Record) -> bool {
        self.request.method == other.request.method
            && self.request.path == other.request.path
            && self.response.status_code == other.response.status_code
    }
}

impl RequestPart {
    /// Capture the request half of an exchange
    ///
    /// The body must already be fully buffered; the caller owns restoring a
    /// readable copy to the downstream handler. The content type driving
    /// body normalization is read from the captured headers, so suppressing
    /// `Content-Type` disables normalization.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::Propagate`], returns the error of a body
    /// declared as JSON that fails to parse. Under [`FailurePolicy::Log`]
    /// the failure is logged and the partially captured part returned.
    pub fn capture(
        parts: &Parts,
        body: &[u8],
        suppressed: &[String],
        policy: FailurePolicy,
    ) -> Result<Self> {
        let mut captured = Self {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            headers: headers::flatten(&parts.headers, suppressed),
            suppressed_headers: suppressed.iter().cloned().collect(),
            url_params: parts.uri.query().map_or_else(BTreeMap::new, parse_query),
            post_forms: BTreeMap::new(),
            body: String::new(),
        };

        let content_type = captured.headers.get("Content-Type").map(String::as_str);
        match normalize(body, content_type) {
            Ok(NormalizedBody::Json(text)) => captured.body = text,
            Ok(NormalizedBody::Form(fields)) => captured.post_forms = fields,
            Ok(NormalizedBody::Raw(_) | NormalizedBody::Unsupported) => {}
            Err(err) => match policy {
                FailurePolicy::Propagate => return Err(err),
                FailurePolicy::Log => warn!("Request body capture failed: {err}"),
            },
        }

        Ok(captured)
    }
}

impl ResponsePart {
    /// Capture the response half of an exchange
    ///
    /// The body must be the fully buffered bytes the downstream handler
    /// produced. Non-JSON bodies are kept verbatim as text.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::Propagate`], returns the error of a body
    /// declared as JSON that fails to parse.
    pub fn capture(
        status: StatusCode,
        headers: &HeaderMap,
        body: &[u8],
        suppressed: &[String],
        policy: FailurePolicy,
    ) -> Result<Self> {
        let mut captured = Self {
            headers: headers::flatten(headers, suppressed),
            suppressed_headers: suppressed.iter().cloned().collect(),
            status_code: status.as_u16(),
            body: String::new(),
        };

        let content_type = captured.headers.get("Content-Type").map(String::as_str);
        match normalize(body, content_type) {
            Ok(NormalizedBody::Json(text) | NormalizedBody::Raw(text)) => captured.body = text,
            Ok(NormalizedBody::Form(_) | NormalizedBody::Unsupported) => {
                captured.body = String::from_utf8_lossy(body).into_owned();
            }
            Err(err) => match policy {
                FailurePolicy::Propagate => return Err(err),
                FailurePolicy::Log => warn!("Response body capture failed: {err}"),
            },
        }

        Ok(captured)
    }
}

/// Parse a raw query string into canonically re-encoded parameters
///
/// Each half of a pair is percent-decoded and re-encoded so equivalent
/// spellings of the same parameter collapse. A pair without `=` is a bare
/// key with an empty value. Undecodable pairs and empty keys are skipped;
/// last-wins on duplicates.
fn parse_query(query: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for pair in query.split('&') {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let Some(key) = decode_component(raw_key) else {
            continue;
        };
        let Some(value) = decode_component(raw_value) else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        params.insert(
            urlencoding::encode(&key).into_owned(),
            urlencoding::encode(&value).into_owned(),
        );
    }
    params
}

/// Percent-decode one query component, `+` as space
fn decode_component(component: &str) -> Option<String> {
    if !has_valid_escapes(component) {
        return None;
    }
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(Cow::into_owned)
}

fn has_valid_escapes(component: &str) -> bool {
    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
