//! Per-domain progress counters
//!
//! Every domain bucket gets a counter when it is scheduled. Worker tasks bump
//! their own counter; anyone holding the board can take a snapshot at any time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Progress of one domain bucket
#[derive(Debug)]
pub struct BucketProgress {
    domain: String,
    total: usize,
    completed: AtomicUsize,
}

impl BucketProgress {
    pub fn new(domain: impl Into<String>, total: usize) -> Self {
        Self {
            domain: domain.into(),
            total,
            completed: AtomicUsize::new(0),
        }
    }

    /// Marks one more URL as handled, returning the new count
    pub fn advance(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn is_done(&self) -> bool {
        self.completed() >= self.total
    }
}

/// Point-in-time view of one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub domain: String,
    pub completed: usize,
    pub total: usize,
}

/// All buckets scheduled so far
#[derive(Debug, Default)]
pub struct ProgressBoard {
    buckets: Mutex<Vec<Arc<BucketProgress>>>,
}

impl ProgressBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bucket and returns its counter
    pub fn register(&self, domain: &str, total: usize) -> Arc<BucketProgress> {
        let bucket = Arc::new(BucketProgress::new(domain, total));
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&bucket));
        bucket
    }

    pub fn snapshot(&self) -> Vec<ProgressSnapshot> {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|bucket| ProgressSnapshot {
                domain: bucket.domain().to_string(),
                completed: bucket.completed(),
                total: bucket.total(),
            })
            .collect()
    }

    /// Returns (URLs handled, URLs scheduled, buckets still running)
    pub fn totals(&self) -> (usize, usize, usize) {
        let buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets.iter().fold((0, 0, 0), |(done, total, active), bucket| {
            (
                done + bucket.completed(),
                total + bucket.total(),
                active + usize::from(!bucket.is_done()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_advance() {
        let bucket = BucketProgress::new("a.com", 2);
        assert!(!bucket.is_done());
        assert_eq!(bucket.advance(), 1);
        assert_eq!(bucket.advance(), 2);
        assert!(bucket.is_done());
    }

    #[test]
    fn test_board_snapshot_and_totals() {
        let board = ProgressBoard::new();
        let a = board.register("a.com", 3);
        board.register("b.com", 1).advance();
        a.advance();

        assert_eq!(
            board.snapshot(),
            vec![
                ProgressSnapshot {
                    domain: "a.com".to_string(),
                    completed: 1,
                    total: 3
                },
                ProgressSnapshot {
                    domain: "b.com".to_string(),
                    completed: 1,
                    total: 1
                },
            ]
        );
        assert_eq!(board.totals(), (2, 4, 1));
    }
}
