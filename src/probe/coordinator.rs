//! End-to-end check run
//!
//! Ties the pieces together:
//! - Scanning the bookmark directory and extracting URLs
//! - Building the HTTP prober from configuration
//! - Dispatching classification across domains
//! - Logging progress while the run is going

use crate::config::Config;
use crate::probe::classifier::Classifier;
use crate::probe::dispatcher::{DispatchReport, Dispatcher};
use crate::probe::fetcher::Fetcher;
use crate::probe::progress::ProgressBoard;
use crate::probe::source::SiteProber;
use crate::scan::{extract_url, list_files};
use crate::sites::SiteRegistry;
use crate::state::TrackedUrl;
use crate::{ScanError, ScoutError};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How often progress is logged during a run
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// A bookmark that could not be turned into a tracked URL
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: ScanError,
}

/// Everything a check run produced
#[derive(Debug)]
pub struct CheckRun {
    pub report: DispatchReport,
    pub scan_failures: Vec<ScanFailure>,
}

impl CheckRun {
    /// True when every bookmark was read and every URL was checked
    pub fn is_complete(&self) -> bool {
        self.scan_failures.is_empty() && self.report.untested().next().is_none()
    }
}

/// Reads every bookmark under `directory`
///
/// Duplicate URLs are checked once. Unreadable bookmarks are collected, not
/// fatal.
pub fn collect_bookmarks(
    directory: &Path,
) -> Result<(Vec<TrackedUrl>, Vec<ScanFailure>), ScanError> {
    let mut urls = BTreeSet::new();
    let mut failures = Vec::new();

    for path in list_files(directory)? {
        match extract_url(&path) {
            Ok(url) => {
                urls.insert(url);
            }
            Err(error) => {
                tracing::warn!("Skipping {}: {}", path.display(), error);
                failures.push(ScanFailure { path, error });
            }
        }
    }

    let mut tracked = Vec::with_capacity(urls.len());
    for url in urls {
        match TrackedUrl::new(url.as_str()) {
            Ok(t) => tracked.push(t),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                failures.push(ScanFailure {
                    path: PathBuf::from(url),
                    error: ScanError::Url(e),
                });
            }
        }
    }

    tracing::info!(
        "Loaded {} unique URL(s), {} unreadable bookmark(s)",
        tracked.len(),
        failures.len()
    );
    Ok((tracked, failures))
}

/// Builds the production dispatcher for a configuration
pub fn build_dispatcher(
    config: &Config,
    registry: SiteRegistry,
) -> Result<Dispatcher<SiteProber>, ScoutError> {
    let fetcher = Fetcher::from_config(&config.probe)?;
    let prober = SiteProber::new(fetcher, Arc::new(registry));
    let classifier = Classifier::new(prober).with_step_pause(config.probe.step_pause());

    Ok(
        Dispatcher::new(classifier, config.dispatch.max_concurrent_domains as usize)
            .with_skip_domains(&config.skip_domains)
            .with_bucket_delay(config.probe.bucket_delay()),
    )
}

/// Scans `directory` and classifies every bookmarked URL
pub async fn run_check(
    config: &Config,
    registry: SiteRegistry,
    directory: &Path,
    token: &CancellationToken,
) -> Result<CheckRun, ScoutError> {
    let start_time = Instant::now();
    let (tracked, scan_failures) = collect_bookmarks(directory)?;
    let dispatcher = build_dispatcher(config, registry)?;

    let ticker_stop = CancellationToken::new();
    let ticker = tokio::spawn(log_progress(dispatcher.progress(), ticker_stop.clone()));

    let report = dispatcher.run(tracked, token).await;

    ticker_stop.cancel();
    if let Err(e) = ticker.await {
        tracing::debug!("Progress logger ended abnormally: {:?}", e);
    }

    tracing::info!(
        "Checked {}/{} URL(s) in {:?}",
        report.tested_count(),
        report.urls.len(),
        start_time.elapsed()
    );

    Ok(CheckRun {
        report,
        scan_failures,
    })
}

async fn log_progress(board: Arc<ProgressBoard>, stop: CancellationToken) {
    let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
    // The first tick completes immediately
    interval.tick().await;
    loop {
        tokio::select! {
            _ = stop.cancelled() => return,
            _ = interval.tick() => {
                let (done, total, active) = board.totals();
                tracing::info!(
                    "Progress: {}/{} URL(s) checked, {} domain(s) in progress",
                    done,
                    total,
                    active
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_bookmarks_dedupes_and_reports_failures() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.url"), "URL=https://a.com/chapter-10\n").unwrap();
        fs::write(dir.path().join("b.url"), "URL=https://a.com/chapter-10\n").unwrap();
        fs::write(
            dir.path().join("c.desktop"),
            "URL=https://b.com/chapter-3\nIcon=x\n",
        )
        .unwrap();
        fs::write(dir.path().join("d.url"), "nothing useful").unwrap();
        fs::write(dir.path().join("e.txt"), "URL=https://c.com/1").unwrap();

        let (tracked, failures) = collect_bookmarks(dir.path()).unwrap();

        let urls: Vec<&str> = tracked.iter().map(TrackedUrl::url).collect();
        assert_eq!(urls, vec!["https://a.com/chapter-10", "https://b.com/chapter-3"]);
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test]
    async fn test_run_check_without_network() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.url"), "URL=https://a.com/chapter-2\n").unwrap();
        fs::write(dir.path().join("b.url"), "URL=https://nowhere.example/vol-1/chapter-20\n").unwrap();

        let run = run_check(
            &Config::default(),
            SiteRegistry::new(),
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(run.is_complete());
        let mut kinds: Vec<_> = run.report.urls.iter().map(TrackedUrl::kind).collect();
        kinds.sort();
        assert_eq!(
            kinds,
            vec![crate::StatusKind::HasVol, crate::StatusKind::Tiny]
        );
    }
}
