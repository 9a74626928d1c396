//! Anchor-based extraction of values from a stored dataflow script.
//!
//! None of these functions fail. A missing anchor means the value is
//! unknown and is reported as an empty string or an empty list, so that a
//! single damaged remote resource does not abort a whole status query.

use regex::Regex;
use std::sync::LazyLock;

use super::anchors::{
    COLUMN_BREAK, FILE_PATTERN_CLOSE, FILE_PATTERN_OPEN, MAP_COLUMN_CLOSE, MAP_COLUMN_OPEN,
    WILDCARD_CLOSE, WILDCARD_OPEN,
};

/// Returns the text between `open` and the first `close` that follows it.
fn between<'a>(doc: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = doc.find(open)? + open.len();
    let len = doc[start..].find(close)?;
    Some(&doc[start..start + len])
}

/// Extracts the projected columns, key first.
///
/// Empty segments are dropped, which also accepts single-column scripts
/// rendered with a trailing separator.
#[must_use]
pub fn extract_columns(doc: &str) -> Vec<String> {
    between(doc, MAP_COLUMN_OPEN, MAP_COLUMN_CLOSE)
        .map(|list| {
            list.replace(COLUMN_BREAK, "")
                .split(',')
                .filter(|c| !c.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Extracts the source `(folder, file)` from the wildcard path.
///
/// The path is split at its last `/`; a path without `/` yields an empty
/// folder.
#[must_use]
pub fn extract_source_location(doc: &str) -> (String, String) {
    between(doc, WILDCARD_OPEN, WILDCARD_CLOSE)
        .map(|path| match path.rfind('/') {
            Some(idx) => (path[..idx].to_string(), path[idx + 1..].to_string()),
            None => (String::new(), path.to_string()),
        })
        .unwrap_or_default()
}

/// Extracts the sink file pattern.
#[must_use]
pub fn extract_sink_file_pattern(doc: &str) -> String {
    between(doc, FILE_PATTERN_OPEN, FILE_PATTERN_CLOSE)
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[allow(clippy::expect_used)]
static ENDPOINT_ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://(.*?)\.blob").expect("static regex is valid"));

/// Extracts the storage account from a blob endpoint such as
/// `https://account.blob.core.windows.net/`.
#[must_use]
pub fn storage_account_from_endpoint(endpoint: &str) -> String {
    ENDPOINT_ACCOUNT
        .captures(endpoint)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
