//! Chapter classification
//!
//! Decides, for one bookmarked chapter URL, whether the next chapter is out
//! and whether the bookmark itself still looks healthy. The checks run in a
//! fixed order and the first one that fires wins:
//!
//! 1. Static checks on the URL text (`vol`, non-integer chapter, tiny number,
//!    dangerous URL pattern). No network traffic.
//! 2. `Exists`: the page is there but neither the previous chapter nor the
//!    chapter-5 sentinel is.
//! 3. `Missing`: the page is gone but some chapter after it exists.
//! 4. `PointFive`: a `.5` release sits just before this chapter.
//! 5. `Broken`: nothing anywhere near this chapter exists.
//! 6. Otherwise `Success`.

use crate::probe::source::ChapterSource;
use crate::state::Status;
use crate::url::{split_on_number, ChapterSplit};
use crate::ProbeError;
use std::collections::HashMap;
use std::time::Duration;

/// Chapters at or below this number are reported without probing
pub const TINY_THRESHOLD: f64 = 5.0;

/// Early chapter assumed to exist for any series the site carries
pub const SENTINEL_CHAPTER: f64 = 5.0;

/// Offsets past the current chapter searched when the current one is gone
pub const MISSING_OFFSETS: [f64; 9] = [0.1, 0.5, 1.0, 1.1, 2.0, 2.1, 5.0, 10.0, 20.0];

/// Classifies chapter URLs against a [`ChapterSource`]
#[derive(Debug)]
pub struct Classifier<S> {
    source: S,
    step_pause: Duration,
}

impl<S: ChapterSource> Classifier<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            step_pause: Duration::ZERO,
        }
    }

    /// Sets the pause taken between classification steps
    pub fn with_step_pause(mut self, pause: Duration) -> Self {
        self.step_pause = pause;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Classifies `url`
    ///
    /// Never fails: probe errors become `Unknown` (no detector for the site)
    /// or `BadRequest` carrying the error.
    pub async fn classify(&self, url: &str) -> Status {
        if url.to_lowercase().contains("vol") {
            return Status::HasVol;
        }

        let split = match split_on_number(url) {
            Ok(split) => split,
            Err(_) => return Status::NotInt,
        };
        if !split.is_whole() {
            return Status::NotInt;
        }

        let n = split.number;
        if n <= TINY_THRESHOLD {
            return Status::Tiny;
        }
        if is_dangerous_pattern(&split) {
            return Status::Pattern;
        }

        let mut session = ProbeSession::new(&self.source, split);
        match self.probe_neighbourhood(&mut session, n).await {
            Ok(status) => status,
            Err(ProbeError::UnknownDomain { .. }) => Status::Unknown,
            Err(e) => {
                tracing::warn!("Request failed while checking {}: {}", url, e);
                Status::BadRequest(e)
            }
        }
    }

    async fn probe_neighbourhood(
        &self,
        session: &mut ProbeSession<'_, S>,
        n: f64,
    ) -> Result<Status, ProbeError> {
        if session.found(n).await?
            && !session.found(n - 1.0).await?
            && !session.found(SENTINEL_CHAPTER).await?
        {
            return Ok(Status::Exists);
        }
        self.pause().await;

        if !session.found(n).await? {
            for offset in MISSING_OFFSETS {
                if session.found(n + offset).await? {
                    return Ok(Status::Missing);
                }
            }
            self.pause().await;

            if session.found(n - 0.5).await? {
                return Ok(Status::PointFive);
            }
        }
        self.pause().await;

        let neighbours = [
            n,
            n - 1.0,
            SENTINEL_CHAPTER,
            n + 0.1,
            n + 0.5,
            n - 0.5,
            n + 1.0,
            n + 1.1,
            n + 5.0,
        ];
        if !session.any_found(&neighbours).await? {
            return Ok(Status::Broken);
        }
        self.pause().await;

        Ok(Status::Success)
    }

    async fn pause(&self) {
        if !self.step_pause.is_zero() {
            tokio::time::sleep(self.step_pause).await;
        }
    }
}

/// Mangabuddy serves unrelated pages for `/mbx` slugs and lettered chapters
fn is_dangerous_pattern(split: &ChapterSplit<'_>) -> bool {
    split.prefix.contains("mangabuddy")
        && (split.prefix.contains("/mbx") || split.suffix.chars().any(char::is_alphabetic))
}

/// Probe state for one classification
///
/// Each constructed URL is fetched at most once; later checks of the same
/// URL reuse the first answer.
struct ProbeSession<'a, S> {
    source: &'a S,
    split: ChapterSplit<'a>,
    cache: HashMap<String, bool>,
}

impl<'a, S: ChapterSource> ProbeSession<'a, S> {
    fn new(source: &'a S, split: ChapterSplit<'a>) -> Self {
        Self {
            source,
            split,
            cache: HashMap::new(),
        }
    }

    /// True if any spelling of chapter `number` exists
    async fn found(&mut self, number: f64) -> Result<bool, ProbeError> {
        for candidate in self.split.candidates(number) {
            if self.fetch(candidate).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn any_found(&mut self, numbers: &[f64]) -> Result<bool, ProbeError> {
        for &number in numbers {
            if self.found(number).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn fetch(&mut self, url: String) -> Result<bool, ProbeError> {
        if let Some(&found) = self.cache.get(&url) {
            return Ok(found);
        }
        let found = self.source.chapter_found(&url).await?;
        self.cache.insert(url, found);
        Ok(found)
    }
}
