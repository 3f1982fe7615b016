use crate::config::types::Config;
use crate::config::validation::validate;
use crate::crawler::CrawlTarget;
use crate::url::normalize_url;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitesweep::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Workers: {}", config.crawler.workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Loads the crawl target list from a text file
///
/// The file holds one URL per line. Blank lines and lines starting with `#`
/// are skipped. Each URL is normalized; duplicates (after normalization) keep
/// their first occurrence so every target is crawled exactly once.
///
/// # Arguments
///
/// * `path` - Path to the target list file
///
/// # Returns
///
/// * `Ok(Vec<CrawlTarget>)` - Targets in file order, positions assigned
/// * `Err(ConfigError)` - Unreadable file, invalid URL, or empty list
pub fn load_targets(path: &Path) -> Result<Vec<CrawlTarget>, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut targets = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let url = normalize_url(line).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "{}:{}: '{}': {}",
                path.display(),
                line_no + 1,
                line,
                e
            ))
        })?;

        if seen.insert(url.to_string()) {
            targets.push(CrawlTarget::new(url, targets.len()));
        } else {
            tracing::debug!("Skipping duplicate target on line {}", line_no + 1);
        }
    }

    if targets.is_empty() {
        return Err(ConfigError::EmptyTargets(format!(
            "no crawl targets found in {}",
            path.display()
        )));
    }

    Ok(targets)
}
