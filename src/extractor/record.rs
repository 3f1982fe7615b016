//! The normalized metadata record
//!
//! A record is fully shaped: every field is present on every record, and a
//! page lacking a given metadata form yields that field's empty default,
//! never a missing field. Only `url` is guaranteed non-empty.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Normalized extraction output for one successfully fetched page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataRecord {
    /// The page URL (always present, non-empty)
    pub url: String,

    /// Text of the first title element, falling back to `og:title`
    pub title: String,

    /// Meta description, falling back to `og:description`
    pub meta_description: String,

    /// Meta keywords, comma-split, trimmed, de-duplicated in document order
    pub meta_keywords: Vec<String>,

    /// Author from the first matching conventional meta tag
    pub author: String,

    /// Publish date from the first matching conventional meta tag, verbatim
    pub publish_date: String,

    /// Canonical link, resolved absolute against the page URL
    pub canonical_url: String,

    /// Page-level language attribute
    pub language: String,

    /// Open Graph properties keyed by the part after `og:`
    pub open_graph: BTreeMap<String, String>,

    /// Twitter Card properties keyed by the part after `twitter:`
    pub twitter_card: BTreeMap<String, String>,

    /// Parsed JSON-LD blocks in document order
    pub structured_data: Vec<serde_json::Value>,

    /// Heading text per level, document order within each level
    pub headings: Headings,

    /// Anchor targets partitioned by registrable domain
    pub links: LinkSet,

    /// Image references in document order
    pub images: Vec<ImageRef>,

    /// HTTP status of the fetched response
    pub http_status: u16,

    /// Content-Type of the fetched response
    pub content_type: String,
}

impl MetadataRecord {
    /// Creates an empty record for the given URL
    pub fn new(url: String) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }
}

/// Heading text collected per level H1..H6
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    /// Mutable access by level number (1-6)
    pub(crate) fn level_mut(&mut self, level: u8) -> Option<&mut Vec<String>> {
        match level {
            1 => Some(&mut self.h1),
            2 => Some(&mut self.h2),
            3 => Some(&mut self.h3),
            4 => Some(&mut self.h4),
            5 => Some(&mut self.h5),
            6 => Some(&mut self.h6),
            _ => None,
        }
    }

    /// Total heading count across all levels
    pub fn total(&self) -> usize {
        self.h1.len()
            + self.h2.len()
            + self.h3.len()
            + self.h4.len()
            + self.h5.len()
            + self.h6.len()
    }
}

/// Absolute link URLs partitioned into internal and external sets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSet {
    /// Same registrable domain as the source page
    pub internal: BTreeSet<String>,

    /// Any other domain
    pub external: BTreeSet<String>,
}

impl LinkSet {
    pub fn total(&self) -> usize {
        self.internal.len() + self.external.len()
    }
}

/// One image element's source and description attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageRef {
    /// Resolved absolute source URL
    pub src: String,

    /// Alt text, empty if absent
    pub alt: String,

    /// Title attribute, empty if absent
    pub title: String,
}
