use crate::UrlError;
use url::Url;

/// Normalizes a crawl target URL
///
/// Targets are fetched as given, so normalization is deliberately light. It
/// establishes URL-level identity for deduplication without changing what
/// the server sees:
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme
/// 3. Require a host
/// 4. Remove the fragment (never sent on the wire)
///
/// The host is lowercased by the parser itself.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use sitesweep::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/page#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}
