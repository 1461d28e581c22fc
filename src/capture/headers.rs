//! Header flattening and suppression for captured exchanges

use hyper::HeaderMap;
use std::collections::{BTreeMap, BTreeSet};

/// Flatten a header map into single-valued entries, omitting suppressed names
///
/// Names are canonicalised to `Http-Header-Case` and compared against the
/// suppression list ASCII-case-insensitively. Multi-valued headers collapse
/// to their last value. Values with bytes outside visible ASCII are skipped.
#[must_use]
pub fn flatten(headers: &HeaderMap, suppressed: &[String]) -> BTreeMap<String, String> {
    let exclude: BTreeSet<String> = suppressed.iter().map(|n| n.to_ascii_lowercase()).collect();

    // 1. Serialize to one `Name: value` line per header value
    let serialized = serialize_subset(headers, &exclude);

    // 2. Re-parse the lines into a flat map
    parse_lines(&serialized)
}

/// Canonicalise a header name into `Http-Header-Case`
#[must_use]
pub fn canonical_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut start_of_segment = true;
    for c in name.chars() {
        if start_of_segment {
            canonical.push(c.to_ascii_uppercase());
        } else {
            canonical.push(c.to_ascii_lowercase());
        }
        start_of_segment = c == '-';
    }
    canonical
}

fn serialize_subset(headers: &HeaderMap, exclude: &BTreeSet<String>) -> String {
    let mut serialized = String::new();
    for (name, value) in headers {
        if exclude.contains(name.as_str()) {
            continue;
        }
        // Opaque values have no place in a text document
        let Ok(value) = value.to_str() else {
            continue;
        };
        serialized.push_str(&canonical_name(name.as_str()));
        serialized.push_str(": ");
        serialized.push_str(value);
        serialized.push('\n');
    }
    serialized
}

fn parse_lines(serialized: &str) -> BTreeMap<String, String> {
    let mut flattened = BTreeMap::new();
    for line in serialized.lines() {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        // Later duplicates overwrite earlier ones
        flattened.insert(name.to_string(), value.trim().to_string());
    }
    flattened
}
