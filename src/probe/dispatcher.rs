//! Concurrent per-domain dispatch
//!
//! URLs are grouped by registrable domain. Each group runs as one task that
//! works through its URLs in order, so a site never sees more than one of our
//! requests at a time. A semaphore caps how many domains run at once.
//!
//! Cancellation is cooperative: once the token fires no new domain is started,
//! running domains stop before their next URL, and everything not classified
//! comes back as `Untested`.

use crate::probe::classifier::Classifier;
use crate::probe::progress::{BucketProgress, ProgressBoard};
use crate::probe::source::ChapterSource;
use crate::state::{Status, StatusKind, TrackedUrl};
use crate::url::domain_key;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Groups tracked URLs by domain, keeping input order within each group
pub fn group_by_domain(urls: Vec<TrackedUrl>) -> BTreeMap<String, Vec<TrackedUrl>> {
    let mut buckets: BTreeMap<String, Vec<TrackedUrl>> = BTreeMap::new();
    for tracked in urls {
        buckets
            .entry(tracked.domain().to_string())
            .or_default()
            .push(tracked);
    }
    buckets
}

/// Every URL handed to [`Dispatcher::run`], with its final status
#[derive(Debug)]
pub struct DispatchReport {
    pub urls: Vec<TrackedUrl>,

    /// Whether the run was cut short
    pub cancelled: bool,
}

impl DispatchReport {
    pub fn untested(&self) -> impl Iterator<Item = &TrackedUrl> {
        self.urls
            .iter()
            .filter(|tracked| tracked.kind() == StatusKind::Untested)
    }

    pub fn tested_count(&self) -> usize {
        self.urls.len() - self.untested().count()
    }
}

/// Runs the classifier over domain buckets with bounded concurrency
pub struct Dispatcher<S> {
    classifier: Arc<Classifier<S>>,
    max_concurrent: usize,
    skip_domains: HashSet<String>,
    bucket_delay: Duration,
    progress: Arc<ProgressBoard>,
}

impl<S: ChapterSource + 'static> Dispatcher<S> {
    /// Creates a dispatcher running at most `max_concurrent` domains at once
    pub fn new(classifier: Classifier<S>, max_concurrent: usize) -> Self {
        Self {
            classifier: Arc::new(classifier),
            max_concurrent: max_concurrent.max(1),
            skip_domains: HashSet::new(),
            bucket_delay: Duration::ZERO,
            progress: Arc::new(ProgressBoard::new()),
        }
    }

    /// Domains whose URLs are marked `Skipped` without any request
    ///
    /// Keys are normalised with [`domain_key`], so `www.foo.com` skips `foo.com`.
    pub fn with_skip_domains<I, D>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        self.skip_domains
            .extend(domains.into_iter().map(|d| domain_key(d.as_ref())));
        self
    }

    /// Pause between two successive URLs of the same domain
    pub fn with_bucket_delay(mut self, delay: Duration) -> Self {
        self.bucket_delay = delay;
        self
    }

    pub fn classifier(&self) -> &Classifier<S> {
        &self.classifier
    }

    /// Shared progress counters, updated while [`run`](Self::run) is going
    pub fn progress(&self) -> Arc<ProgressBoard> {
        Arc::clone(&self.progress)
    }

    /// Classifies every URL, returning all of them with their statuses
    pub async fn run(&self, urls: Vec<TrackedUrl>, token: &CancellationToken) -> DispatchReport {
        let expected: Vec<String> = urls.iter().map(|t| t.url().to_string()).collect();
        let buckets = group_by_domain(urls);
        tracing::info!(
            "Checking {} URL(s) across {} domain(s), {} at a time",
            expected.len(),
            buckets.len(),
            self.max_concurrent
        );

        let results = Arc::new(Mutex::new(Vec::with_capacity(expected.len())));
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        let mut leftover = Vec::new();
        let mut buckets = buckets.into_iter();

        for (domain, bucket) in buckets.by_ref() {
            let permit = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let permit = match permit {
                Some(permit) if !token.is_cancelled() => permit,
                _ => {
                    leftover.extend(bucket);
                    break;
                }
            };

            let job = BucketJob {
                skip: self.skip_domains.contains(&domain),
                progress: self.progress.register(&domain, bucket.len()),
                domain,
                urls: bucket,
                delay: self.bucket_delay,
                token: token.clone(),
                results: Arc::clone(&results),
            };
            tasks.spawn(job.run(Arc::clone(&self.classifier), permit));
        }

        for (_, bucket) in buckets {
            leftover.extend(bucket);
        }
        if !leftover.is_empty() {
            tracing::warn!("{} URL(s) were never scheduled", leftover.len());
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Domain task failed: {:?}", e);
            }
        }

        let mut checked =
            std::mem::take(&mut *results.lock().unwrap_or_else(PoisonError::into_inner));
        checked.append(&mut leftover);

        // URLs held by a failed task come back untested
        let lost: Vec<TrackedUrl> = {
            let seen: HashSet<&str> = checked.iter().map(TrackedUrl::url).collect();
            expected
                .iter()
                .filter(|url| !seen.contains(url.as_str()))
                .filter_map(|url| TrackedUrl::new(url.as_str()).ok())
                .collect()
        };
        checked.extend(lost);

        DispatchReport {
            urls: checked,
            cancelled: token.is_cancelled(),
        }
    }
}

/// One domain's worth of work
struct BucketJob {
    domain: String,
    urls: Vec<TrackedUrl>,
    skip: bool,
    delay: Duration,
    token: CancellationToken,
    progress: Arc<BucketProgress>,
    results: Arc<Mutex<Vec<TrackedUrl>>>,
}

impl BucketJob {
    async fn run<S: ChapterSource>(
        self,
        classifier: Arc<Classifier<S>>,
        _permit: OwnedSemaphorePermit,
    ) {
        let mut done = Vec::with_capacity(self.urls.len());
        let mut pending = self.urls.into_iter();
        let mut first = true;

        while let Some(mut tracked) = pending.next() {
            if self.skip {
                tracked.resolve(Status::Skipped);
                self.progress.advance();
                done.push(tracked);
                continue;
            }

            if !first && !self.delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
            first = false;

            if self.token.is_cancelled() {
                done.push(tracked);
                done.extend(pending);
                break;
            }

            let status = tokio::select! {
                biased;
                _ = self.token.cancelled() => None,
                status = classifier.classify(tracked.url()) => Some(status),
            };
            match status {
                Some(status) => {
                    tracing::debug!("{} -> {}", tracked.url(), status.kind());
                    tracked.resolve(status);
                    self.progress.advance();
                    done.push(tracked);
                }
                None => {
                    done.push(tracked);
                    done.extend(pending);
                    break;
                }
            }
        }

        if self.skip {
            tracing::info!("Skipped {} ({} URL(s))", self.domain, self.progress.total());
        } else {
            tracing::info!(
                "Finished {} ({}/{} checked)",
                self.domain,
                self.progress.completed(),
                self.progress.total()
            );
        }

        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(&mut done);
    }
}
