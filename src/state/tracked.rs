use crate::state::status::{Status, StatusKind};
use crate::url::registrable_domain;
use crate::UrlResult;

/// A bookmarked chapter URL and the outcome of checking it
///
/// The URL and its domain are fixed when the bookmark is scanned. The status
/// starts out `Untested` and is resolved exactly once.
#[derive(Debug)]
pub struct TrackedUrl {
    url: String,
    domain: String,
    status: Status,
}

impl TrackedUrl {
    /// Creates an untested entry, deriving the registrable domain from `url`
    pub fn new(url: impl Into<String>) -> UrlResult<Self> {
        let url = url.into();
        let domain = registrable_domain(&url)?;
        Ok(Self {
            url,
            domain,
            status: Status::Untested,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn kind(&self) -> StatusKind {
        self.status.kind()
    }

    /// Records the classification outcome
    ///
    /// Returns false and leaves the entry untouched if it was already resolved
    /// or if `status` is `Untested`.
    pub fn resolve(&mut self, status: Status) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            tracing::warn!(
                "Ignoring status {} for {}: already {}",
                status.kind(),
                self.url,
                self.status.kind()
            );
            return false;
        }
        self.status = status;
        true
    }
}
