//! Response body decoding
//!
//! Character encoding is taken from the Content-Type header when present,
//! sniffed from the document head otherwise, and defaults to UTF-8. Decoding
//! is lossy; a body counts as undecodable only when the result is clearly
//! not text (NUL bytes, or mostly replacement characters).

use crate::extractor::ExtractionError;
use encoding_rs::{Encoding, UTF_8};

/// How much of the body is examined for a meta charset declaration
const SNIFF_WINDOW: usize = 1024;

/// Decodes a response body to a UTF-8 string
///
/// # Arguments
///
/// * `body` - Raw response bytes
/// * `content_type` - The Content-Type header value, possibly with charset
///
/// # Returns
///
/// * `Ok(String)` - Decoded text
/// * `Err(ExtractionError::UndecodableContent)` - Body is not text
pub fn decode_body(body: &[u8], content_type: &str) -> Result<String, ExtractionError> {
    let encoding = charset_param(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| {
            sniff_meta_charset(body).and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or(UTF_8);

    let (decoded, _, _) = encoding.decode(body);
    let text = decoded.into_owned();

    if !looks_like_text(&text) {
        return Err(ExtractionError::UndecodableContent);
    }

    Ok(text)
}

/// Extracts the charset parameter from a Content-Type value
fn charset_param(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let rest = &lower[start..];
    let end = rest.find(';').unwrap_or(rest.len());
    let label = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'');

    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Looks for a `charset=` declaration in the document head
///
/// Covers both `<meta charset="...">` and the http-equiv Content-Type form;
/// both spell it `charset=`.
fn sniff_meta_charset(body: &[u8]) -> Option<String> {
    let head = &body[..body.len().min(SNIFF_WINDOW)];
    let head_str = String::from_utf8_lossy(head).to_lowercase();

    let start = head_str.find("charset=")? + "charset=".len();
    let rest = &head_str[start..];
    let label: String = rest
        .trim_start_matches(|c| c == '"' || c == '\'')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Heuristic for "this decoded to actual text"
fn looks_like_text(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }

    if text.contains('\0') {
        return false;
    }

    let total = text.chars().count();
    let replacements = text.chars().filter(|c| *c == '\u{FFFD}').count();
    replacements * 3 < total
}
