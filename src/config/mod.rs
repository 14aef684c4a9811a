//! Configuration module for Chapter-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is the common case.
//!
//! # Example
//!
//! ```no_run
//! use chapter_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Probing at most {} domains at once", config.dispatch.max_concurrent_domains);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DispatchConfig, OpenConfig, ProbeConfig, SiteEntry, MAX_DELAY_SECS};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;

pub(crate) use validation::validate_sites;
