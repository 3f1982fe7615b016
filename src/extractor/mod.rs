//! Metadata extraction pipeline
//!
//! Turns a successful fetch into a fully shaped [`MetadataRecord`]. Parsing
//! is best-effort: a missing or malformed element yields the corresponding
//! field's empty default. An [`ExtractionError`] is reserved for the
//! catastrophic cases only: a content type that is not HTML/XML-like, or a
//! body that is not text under any attempted encoding.

mod content;
mod encoding;
mod meta_tags;
mod record;
mod structured_data;

pub use record::{Headings, ImageRef, LinkSet, MetadataRecord};

use crate::config::OutputConfig;
use crate::crawler::FetchSuccess;
use scraper::Html;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Content types accepted by the extractor (compared against the mime part
/// only, parameters stripped)
const HTML_LIKE_TYPES: &[&str] = &[
    "text/html",
    "application/xhtml+xml",
    "text/xml",
    "application/xml",
];

/// Catastrophic extraction failure; never retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("body not decodable as text")]
    UndecodableContent,
}

impl ExtractionError {
    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            Self::UnsupportedContentType(_) => ExtractionErrorKind::UnsupportedContentType,
            Self::UndecodableContent => ExtractionErrorKind::UndecodableContent,
        }
    }
}

/// Serializable tag for the two extraction failure cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionErrorKind {
    UnsupportedContentType,
    UndecodableContent,
}

impl std::fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedContentType => write!(f, "unsupported-content-type"),
            Self::UndecodableContent => write!(f, "undecodable-content"),
        }
    }
}

/// Per-page collection limits
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Maximum links collected per page (0 = unlimited)
    pub max_links: usize,

    /// Maximum images collected per page (0 = unlimited)
    pub max_images: usize,
}

impl ExtractOptions {
    pub fn from_output(output: &OutputConfig) -> Self {
        Self {
            max_links: output.max_links_per_page,
            max_images: output.max_images_per_page,
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_links: 50,
            max_images: 20,
        }
    }
}

/// Extracts a metadata record from a successful fetch
///
/// # Arguments
///
/// * `url` - The page URL (used for link and canonical resolution)
/// * `response` - The successful fetch result
/// * `options` - Per-page collection limits
///
/// # Returns
///
/// * `Ok(MetadataRecord)` - Fully shaped record, empty defaults where the
///   page lacked a given metadata form
/// * `Err(ExtractionError)` - Non-HTML content type or undecodable body
pub fn extract(
    url: &Url,
    response: &FetchSuccess,
    options: &ExtractOptions,
) -> Result<MetadataRecord, ExtractionError> {
    if !is_html_like(&response.content_type) {
        return Err(ExtractionError::UnsupportedContentType(
            mime_of(&response.content_type).to_string(),
        ));
    }

    let text = encoding::decode_body(&response.body, &response.content_type)?;
    let doc = Html::parse_document(&text);

    let mut record = MetadataRecord::new(url.to_string());
    record.http_status = response.status_code;
    record.content_type = response.content_type.clone();

    record.open_graph = meta_tags::extract_namespaced_meta(&doc, "og:");
    record.twitter_card = meta_tags::extract_namespaced_meta(&doc, "twitter:");

    record.title = meta_tags::extract_title(&doc);
    if record.title.is_empty() {
        if let Some(og_title) = record.open_graph.get("title") {
            record.title = og_title.clone();
        }
    }

    record.meta_description = meta_tags::extract_description(&doc);
    if record.meta_description.is_empty() {
        if let Some(og_description) = record.open_graph.get("description") {
            record.meta_description = og_description.clone();
        }
    }

    record.meta_keywords = meta_tags::extract_keywords(&doc);
    record.author = meta_tags::extract_author(&doc);
    record.publish_date = meta_tags::extract_publish_date(&doc);
    record.canonical_url = meta_tags::extract_canonical(&doc, url);
    record.language = meta_tags::extract_language(&doc);
    record.structured_data = structured_data::extract_structured_data(&doc);
    record.headings = content::extract_headings(&doc);
    record.links = content::extract_links(&doc, url, options.max_links);
    record.images = content::extract_images(&doc, url, options.max_images);

    Ok(record)
}

/// Checks the mime part of a Content-Type against the accepted set
///
/// An absent Content-Type is treated as HTML and extraction is attempted;
/// the decode step still guards against binary bodies.
fn is_html_like(content_type: &str) -> bool {
    let mime = mime_of(content_type);
    mime.is_empty() || HTML_LIKE_TYPES.contains(&mime)
}

fn mime_of(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or("").trim()
}
