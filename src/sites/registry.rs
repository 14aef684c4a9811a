use crate::config::{validate_sites, Config, SiteEntry};
use crate::sites::detector::{AlwaysFound, ChapterDetector, MarkerDetector};
use crate::url::domain_key;
use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const BUILTIN_TABLE: &str = include_str!("builtin.toml");

#[derive(Debug, Deserialize)]
struct SiteTable {
    #[serde(default)]
    site: Vec<SiteEntry>,
}

/// Maps registrable domains to their chapter detectors
///
/// The registry is filled once at startup and only read afterwards; entries can
/// be added but never replaced, so a domain registered twice is an error.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    detectors: HashMap<String, Arc<dyn ChapterDetector>>,
}

impl SiteRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in site table
    pub fn builtin() -> ConfigResult<Self> {
        let table: SiteTable = toml::from_str(BUILTIN_TABLE)?;
        let mut registry = Self::new();
        for entry in &table.site {
            registry.register_entry(entry)?;
        }
        Ok(registry)
    }

    /// Builds the effective registry for a configuration
    ///
    /// The built-in table comes first (unless disabled), then the entries from
    /// the configuration file are appended.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        validate_sites(&config.sites)?;
        let mut registry = if config.use_builtin_sites {
            Self::builtin()?
        } else {
            Self::new()
        };
        for entry in &config.sites {
            registry.register_entry(entry)?;
        }
        Ok(registry)
    }

    /// Registers a detector for `domain`, normalised with [`domain_key`]
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateSite` if `domain` is already registered.
    pub fn register<D>(&mut self, domain: impl Into<String>, detector: D) -> ConfigResult<()>
    where
        D: ChapterDetector + 'static,
    {
        let domain = domain_key(&domain.into());
        if self.detectors.contains_key(&domain) {
            return Err(ConfigError::DuplicateSite(domain));
        }
        tracing::trace!("Registered detector for {}: {:?}", domain, detector);
        self.detectors.insert(domain, Arc::new(detector));
        Ok(())
    }

    /// Registers a site table entry
    pub fn register_entry(&mut self, entry: &SiteEntry) -> ConfigResult<()> {
        let detector = MarkerDetector::from_entry(entry);
        if detector.accepts_everything() {
            self.register(&entry.domain, AlwaysFound)
        } else {
            self.register(&entry.domain, detector)
        }
    }

    /// Looks up the detector for a registrable domain
    pub fn get(&self, domain: &str) -> Option<Arc<dyn ChapterDetector>> {
        self.detectors.get(domain).cloned()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.detectors.contains_key(domain)
    }

    /// Returns all registered domains, sorted
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.detectors.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
