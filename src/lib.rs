//! Chapter-Scout: a polite manga chapter checker
//!
//! This crate scans a directory of bookmark files, probes the chapter page each
//! bookmark points at, classifies whether a newer chapter is available, and opens
//! the interesting ones in a browser.

pub mod config;
pub mod output;
pub mod probe;
pub mod scan;
pub mod sites;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Chapter-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Site '{0}' is registered more than once")]
    DuplicateSite(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing domain in URL: {0}")]
    MissingDomain(String),

    #[error("There is no number in {0}")]
    NoNumberFound(String),
}

/// Errors raised while probing a single chapter URL
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("No chapter detector is registered for {url}")]
    UnknownDomain { url: String },

    #[error("Request to {url} timed out after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    #[error("Request to {url} was throttled (HTTP {status}) after {attempts} attempt(s)")]
    Throttled {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),
}

/// Errors raised while reading bookmark files
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Unsupported extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("Bookmark does not contain {marker:?} exactly once (found {count})")]
    MalformedBookmark { marker: &'static str, count: usize },

    #[error("Failed to extract a URL from {0}")]
    EmptyUrl(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("New number {new} is not greater than old number {old}")]
    NumberNotIncreasing { old: f64, new: f64 },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),
}

/// Result type alias for Chapter-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use sites::{ChapterDetector, SiteRegistry};
pub use state::{Status, StatusKind, TrackedUrl};
pub use self::url::{registrable_domain, split_on_number, ChapterSplit};
