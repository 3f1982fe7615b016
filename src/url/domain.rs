use url::Url;

/// Common two-part public suffixes
///
/// Not a full public-suffix database; covers the suffixes that show up in
/// practice on publisher hosts so `registrable_domain` does not collapse
/// `news.bbc.co.uk` to `co.uk`.
const TWO_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "net.uk", "com.au", "net.au", "org.au",
    "edu.au", "gov.au", "co.nz", "org.nz", "net.nz", "co.jp", "or.jp", "ne.jp", "ac.jp", "co.kr",
    "or.kr", "com.br", "org.br", "net.br", "com.mx", "org.mx", "com.ar", "com.cn", "org.cn",
    "net.cn", "co.in", "org.in", "net.in", "co.za", "org.za", "com.sg", "com.hk", "com.tw",
];

/// Extracts the host from a URL, lowercased
///
/// This is the key used for rate-limiter state: two URLs share a politeness
/// budget exactly when they share a host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitesweep::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Computes the registrable domain for a host
///
/// Strips a leading `www.`, then collapses the host to its last two labels
/// (or three when the last two form a known two-part public suffix). IP
/// addresses and single-label hosts are returned unchanged. This is the
/// domain unit used to decide whether a link is internal or external.
///
/// # Examples
///
/// ```
/// use sitesweep::url::registrable_domain;
///
/// assert_eq!(registrable_domain("www.example.com"), "example.com");
/// assert_eq!(registrable_domain("news.example.com"), "example.com");
/// assert_eq!(registrable_domain("news.bbc.co.uk"), "bbc.co.uk");
/// assert_eq!(registrable_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn registrable_domain(host: &str) -> String {
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    // IP literals have no registrable domain
    if host.parse::<std::net::IpAddr>().is_ok() {
        return host.to_string();
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if TWO_PART_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };

    if labels.len() <= keep {
        host.to_string()
    } else {
        labels[labels.len() - keep..].join(".")
    }
}

/// Returns true when two hosts belong to the same registrable domain
pub fn same_registrable_domain(a: &str, b: &str) -> bool {
    registrable_domain(a) == registrable_domain(b)
}
