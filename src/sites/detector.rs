use crate::config::SiteEntry;
use std::fmt;

/// Decides, from a fetched page's raw body, whether the requested chapter exists
///
/// Detectors are pure: the same body always gives the same answer. They never
/// see HTTP status codes; a 404 is treated as "not found" before a detector
/// is consulted.
pub trait ChapterDetector: Send + Sync + fmt::Debug {
    /// Returns true if `body` is a real chapter page
    fn detect(&self, body: &str) -> bool;
}

/// Substring markers: all of `contains` present, none of `excludes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerDetector {
    contains: Vec<String>,
    excludes: Vec<String>,
}

impl MarkerDetector {
    pub fn new(contains: Vec<String>, excludes: Vec<String>) -> Self {
        Self { contains, excludes }
    }

    /// Builds a detector from a site table entry
    pub fn from_entry(entry: &SiteEntry) -> Self {
        Self::new(entry.contains.clone(), entry.excludes.clone())
    }

    /// True if the detector has no markers, i.e. accepts every page
    pub fn accepts_everything(&self) -> bool {
        self.contains.is_empty() && self.excludes.is_empty()
    }
}

impl ChapterDetector for MarkerDetector {
    fn detect(&self, body: &str) -> bool {
        self.contains.iter().all(|marker| body.contains(marker.as_str()))
            && !self.excludes.iter().any(|marker| body.contains(marker.as_str()))
    }
}

/// Accepts every page; for sites that answer 404 when a chapter is missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysFound;

impl ChapterDetector for AlwaysFound {
    fn detect(&self, _body: &str) -> bool {
        true
    }
}
