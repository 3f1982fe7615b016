//! URL handling module for Sitesweep
//!
//! This module provides target URL normalization, host extraction, and the
//! registrable-domain logic used to partition links into internal and
//! external sets.

mod domain;
mod normalize;

pub use domain::{extract_domain, registrable_domain, same_registrable_domain};
pub use normalize::normalize_url;
