//! Configuration handling for Sitesweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files and the plain-text crawl target list.

mod parser;
mod types;
mod validation;

pub use parser::{load_config, load_targets};
pub use types::{Config, CrawlerConfig, OutputConfig, RetryConfig, UserAgentConfig};
pub use validation::validate;
