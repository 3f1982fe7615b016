//! Meta tag extraction
//!
//! Title, description, keywords, author, publish date, canonical URL,
//! language, and the Open Graph / Twitter Card namespaces. Every helper is
//! tolerant of absence: a missing or malformed element yields the empty
//! default, never an error.

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::collections::HashSet;
use url::Url;

/// Conventional author meta tags, in priority order
const AUTHOR_META: &[(&str, &str)] = &[("name", "author"), ("property", "article:author")];

/// Conventional publish-date meta tags, in priority order
const PUBLISH_DATE_META: &[(&str, &str)] = &[
    ("property", "article:published_time"),
    ("name", "pubdate"),
    ("name", "publishdate"),
    ("itemprop", "datePublished"),
];

/// Extracts the text of the first title element
pub fn extract_title(doc: &Html) -> String {
    let selector = match Selector::parse("title") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    doc.select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Returns the content of the first matching meta tag from a priority list
///
/// Each candidate is an (attribute, value) pair, e.g. `("name", "author")`.
/// The first tag with non-empty content wins; no guessing from visible text.
pub fn first_meta_content(doc: &Html, candidates: &[(&str, &str)]) -> String {
    for (attr, value) in candidates {
        let Ok(selector) = Selector::parse(&format!(r#"meta[{}="{}"]"#, attr, value)) else {
            continue;
        };

        for el in doc.select(&selector) {
            if let Some(content) = el.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return content.to_string();
                }
            }
        }
    }

    String::new()
}

/// Extracts the meta description
pub fn extract_description(doc: &Html) -> String {
    first_meta_content(doc, &[("name", "description")])
}

/// Extracts the author from conventional meta tags
pub fn extract_author(doc: &Html) -> String {
    first_meta_content(doc, AUTHOR_META)
}

/// Extracts the publish date from conventional meta tags, verbatim
pub fn extract_publish_date(doc: &Html) -> String {
    first_meta_content(doc, PUBLISH_DATE_META)
}

/// Extracts meta keywords as a comma-split, de-duplicated list
///
/// Order follows the document; duplicates compare case-insensitively and
/// keep their first spelling.
pub fn extract_keywords(doc: &Html) -> Vec<String> {
    let raw = first_meta_content(doc, &[("name", "keywords")]);

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if !part.is_empty() && seen.insert(part.to_lowercase()) {
            keywords.push(part.to_string());
        }
    }
    keywords
}

/// Extracts the canonical URL, resolved against the page URL
pub fn extract_canonical(doc: &Html, base_url: &Url) -> String {
    let Ok(selector) = Selector::parse(r#"link[rel="canonical"]"#) else {
        return String::new();
    };

    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| base_url.join(href.trim()).ok())
        .map(|url| url.to_string())
        .unwrap_or_default()
}

/// Extracts the page-level language attribute
pub fn extract_language(doc: &Html) -> String {
    let Ok(selector) = Selector::parse("html") else {
        return String::new();
    };

    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|lang| lang.trim().to_string())
        .unwrap_or_default()
}

/// Collects meta tags under a namespace prefix into a flat map
///
/// Keys are the part of the property/name after the prefix (`og:title` →
/// `title`). On duplicate keys the later tag in document order wins.
pub fn extract_namespaced_meta(doc: &Html, prefix: &str) -> BTreeMap<String, String> {
    let Ok(selector) = Selector::parse("meta") else {
        return BTreeMap::new();
    };

    let mut map = BTreeMap::new();
    for el in doc.select(&selector) {
        let key = el
            .value()
            .attr("property")
            .or_else(|| el.value().attr("name"));

        let (Some(key), Some(content)) = (key, el.value().attr("content")) else {
            continue;
        };

        if let Some(suffix) = key.strip_prefix(prefix) {
            if !suffix.is_empty() && !content.is_empty() {
                map.insert(suffix.to_string(), content.to_string());
            }
        }
    }

    map
}
