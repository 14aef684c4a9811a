//! Chapter probing engine
//!
//! This module contains everything between "a list of bookmarked URLs" and
//! "a status for each of them":
//! - HTTP fetching with retry and backoff
//! - Per-site chapter detection behind the [`ChapterSource`] trait
//! - The classification ladder
//! - Per-domain dispatch with bounded concurrency and cancellation
//! - Interrupt handling

pub mod classifier;
pub mod coordinator;
pub mod dispatcher;
pub mod fetcher;
pub mod progress;
pub mod shutdown;
pub mod source;

pub use classifier::Classifier;
pub use coordinator::{build_dispatcher, collect_bookmarks, run_check, CheckRun, ScanFailure};
pub use dispatcher::{group_by_domain, DispatchReport, Dispatcher};
pub use fetcher::{build_http_client, random_user_agent, Fetcher, ProbeOutcome, RetryPolicy};
pub use progress::{BucketProgress, ProgressBoard, ProgressSnapshot};
pub use shutdown::{listen_for_interrupts, Interrupt, Shutdown};
pub use source::{ChapterSource, SiteProber};
