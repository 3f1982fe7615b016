//! JSON-LD structured data extraction
//!
//! Every `<script type="application/ld+json">` block is parsed as a JSON
//! document. A block that fails to parse is logged and skipped; the rest of
//! the page extraction proceeds.

use scraper::{Html, Selector};

/// Parses all JSON-LD blocks in document order
pub fn extract_structured_data(doc: &Html) -> Vec<serde_json::Value> {
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for el in doc.select(&selector) {
        let raw = el.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => blocks.push(value),
            Err(e) => {
                tracing::debug!("Skipping unparsable JSON-LD block: {}", e);
            }
        }
    }

    blocks
}
