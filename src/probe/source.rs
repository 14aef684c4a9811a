//! Answers "does this chapter URL exist?" for the classifier

use crate::probe::fetcher::{Fetcher, ProbeOutcome};
use crate::sites::SiteRegistry;
use crate::url::registrable_domain;
use crate::ProbeError;
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can tell whether a chapter page exists
///
/// The classifier only ever talks to this trait, so tests can drive it with
/// a plain predicate instead of a web server.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    /// Returns true if `url` points at a real chapter page
    ///
    /// # Errors
    ///
    /// `ProbeError::UnknownDomain` when no detector is registered for the
    /// URL's site; network errors once retries are exhausted.
    async fn chapter_found(&self, url: &str) -> Result<bool, ProbeError>;
}

/// Probes chapter URLs over HTTP and runs the site's detector on the body
#[derive(Debug, Clone)]
pub struct SiteProber {
    fetcher: Fetcher,
    registry: Arc<SiteRegistry>,
}

impl SiteProber {
    pub fn new(fetcher: Fetcher, registry: Arc<SiteRegistry>) -> Self {
        Self { fetcher, registry }
    }

    pub fn registry(&self) -> &SiteRegistry {
        &self.registry
    }
}

#[async_trait]
impl ChapterSource for SiteProber {
    async fn chapter_found(&self, url: &str) -> Result<bool, ProbeError> {
        let domain = registrable_domain(url)?;
        // Look the site up before touching the network
        let detector = self
            .registry
            .get(&domain)
            .ok_or_else(|| ProbeError::UnknownDomain {
                url: url.to_string(),
            })?;

        match self.fetcher.probe(url).await? {
            ProbeOutcome::NotFound => Ok(false),
            ProbeOutcome::Page(body) => {
                let found = detector.detect(&body);
                tracing::trace!("{} -> {}", url, if found { "found" } else { "absent" });
                Ok(found)
            }
        }
    }
}
