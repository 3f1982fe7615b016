//! Headings, links, and images
//!
//! Document-structure extraction: heading text per level, anchor targets
//! partitioned into internal and external sets by registrable domain, and
//! image references with resolved sources.

use crate::extractor::record::{Headings, ImageRef, LinkSet};
use crate::url::same_registrable_domain;
use scraper::{Html, Selector};
use url::Url;

/// Extracts heading text for H1 through H6
///
/// Text within each element is concatenated and trimmed; empty headings are
/// dropped. Order within a level follows the document.
pub fn extract_headings(doc: &Html) -> Headings {
    let mut headings = Headings::default();

    for level in 1..=6u8 {
        let Ok(selector) = Selector::parse(&format!("h{}", level)) else {
            continue;
        };

        let Some(bucket) = headings.level_mut(level) else {
            continue;
        };

        for el in doc.select(&selector) {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                bucket.push(text);
            }
        }
    }

    headings
}

/// Extracts anchor targets, partitioned into internal and external sets
///
/// Every href is resolved against the page URL; only http(s) results are
/// kept. A link is internal when its host shares the page's registrable
/// domain. `max` caps the number of anchors considered (0 = unlimited).
pub fn extract_links(doc: &Html, base_url: &Url, max: usize) -> LinkSet {
    let mut links = LinkSet::default();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    let page_host = base_url.host_str().unwrap_or("");
    let mut collected = 0;

    for el in doc.select(&selector) {
        if max != 0 && collected >= max {
            break;
        }

        let Some(href) = el.value().attr("href") else {
            continue;
        };

        let Some(resolved) = resolve_link(href, base_url) else {
            continue;
        };

        let is_internal = resolved
            .host_str()
            .map(|host| same_registrable_domain(host, page_host))
            .unwrap_or(false);

        let inserted = if is_internal {
            links.internal.insert(resolved.to_string())
        } else {
            links.external.insert(resolved.to_string())
        };

        if inserted {
            collected += 1;
        }
    }

    links
}

/// Extracts image references in document order
///
/// Sources are resolved against the page URL; images without a usable src
/// are skipped. `max` caps the count (0 = unlimited).
pub fn extract_images(doc: &Html, base_url: &Url, max: usize) -> Vec<ImageRef> {
    let mut images = Vec::new();

    let Ok(selector) = Selector::parse("img") else {
        return images;
    };

    for el in doc.select(&selector) {
        if max != 0 && images.len() >= max {
            break;
        }

        let Some(src) = el.value().attr("src") else {
            continue;
        };

        let src = src.trim();
        if src.is_empty() || src.starts_with("data:") {
            continue;
        }

        let Ok(resolved) = base_url.join(src) else {
            continue;
        };

        images.push(ImageRef {
            src: resolved.to_string(),
            alt: el.value().attr("alt").unwrap_or("").trim().to_string(),
            title: el.value().attr("title").unwrap_or("").trim().to_string(),
        });
    }

    images
}

/// Resolves an anchor href to an absolute http(s) URL
///
/// Returns None for schemes that are not crawlable (javascript, mailto,
/// tel, data) and for fragment-only links.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn base() -> Url {
        Url::parse("https://www.example.com/section/page").unwrap()
    }

    #[test]
    fn test_headings_by_level_in_order() {
        let doc = parse(
            r#"<html><body>
            <h1>Main</h1>
            <h2>First Sub</h2>
            <h2>Second Sub</h2>
            <h3>  Detail  </h3>
            </body></html>"#,
        );

        let headings = extract_headings(&doc);
        assert_eq!(headings.h1, vec!["Main"]);
        assert_eq!(headings.h2, vec!["First Sub", "Second Sub"]);
        assert_eq!(headings.h3, vec!["Detail"]);
        assert!(headings.h4.is_empty());
    }

    #[test]
    fn test_empty_headings_dropped() {
        let doc = parse("<html><body><h1>   </h1><h1>Real</h1></body></html>");
        let headings = extract_headings(&doc);
        assert_eq!(headings.h1, vec!["Real"]);
    }

    #[test]
    fn test_nested_heading_text_concatenated() {
        let doc = parse("<html><body><h1>Breaking: <em>big</em> news</h1></body></html>");
        let headings = extract_headings(&doc);
        assert_eq!(headings.h1, vec!["Breaking: big news"]);
    }

    #[test]
    fn test_links_partitioned_by_registrable_domain() {
        let doc = parse(
            r#"<html><body>
            <a href="/about">About</a>
            <a href="https://blog.example.com/post">Blog</a>
            <a href="https://other.com/page">Other</a>
            </body></html>"#,
        );

        let links = extract_links(&doc, &base(), 0);
        assert!(links
            .internal
            .contains("https://www.example.com/about"));
        assert!(links.internal.contains("https://blog.example.com/post"));
        assert!(links.external.contains("https://other.com/page"));
        assert_eq!(links.internal.len(), 2);
        assert_eq!(links.external.len(), 1);
    }

    #[test]
    fn test_non_crawlable_schemes_skipped() {
        let doc = parse(
            r##"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:x@example.com">Mail</a>
            <a href="tel:+123">Tel</a>
            <a href="#section">Anchor</a>
            <a href="/real">Real</a>
            </body></html>"##,
        );

        let links = extract_links(&doc, &base(), 0);
        assert_eq!(links.total(), 1);
    }

    #[test]
    fn test_links_deduplicated() {
        let doc = parse(
            r#"<html><body>
            <a href="/page">One</a>
            <a href="/page">Two</a>
            </body></html>"#,
        );

        let links = extract_links(&doc, &base(), 0);
        assert_eq!(links.internal.len(), 1);
    }

    #[test]
    fn test_link_cap() {
        let html: String = (0..20)
            .map(|i| format!(r#"<a href="/page{}">L</a>"#, i))
            .collect();
        let doc = parse(&format!("<html><body>{}</body></html>", html));

        let links = extract_links(&doc, &base(), 5);
        assert_eq!(links.total(), 5);
    }

    #[test]
    fn test_images_resolved_with_attrs() {
        let doc = parse(
            r#"<html><body>
            <img src="/logo.png" alt="Logo" title="Our logo">
            <img src="https://cdn.example.net/banner.jpg">
            <img alt="no src">
            </body></html>"#,
        );

        let images = extract_images(&doc, &base(), 0);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].src, "https://www.example.com/logo.png");
        assert_eq!(images[0].alt, "Logo");
        assert_eq!(images[0].title, "Our logo");
        assert_eq!(images[1].src, "https://cdn.example.net/banner.jpg");
        assert_eq!(images[1].alt, "");
    }

    #[test]
    fn test_image_cap() {
        let html: String = (0..10)
            .map(|i| format!(r#"<img src="/img{}.png">"#, i))
            .collect();
        let doc = parse(&format!("<html><body>{}</body></html>", html));

        let images = extract_images(&doc, &base(), 3);
        assert_eq!(images.len(), 3);
    }

    #[test]
    fn test_data_uri_images_skipped() {
        let doc = parse(r#"<html><body><img src="data:image/png;base64,AAAA"></body></html>"#);
        assert!(extract_images(&doc, &base(), 0).is_empty());
    }
}
