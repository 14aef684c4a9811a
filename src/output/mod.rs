//! Output module for check results
//!
//! This module handles:
//! - Rendering grouped result listings
//! - Opening the URLs worth a look, rate-limited

pub mod opener;
pub mod report;

pub use opener::{open_candidates, wait_for_enter, CommandOpener, OpenSummary, UrlOpener};
pub use report::{banner, format_entry, render_scan_failures, OpenFilter, OpenGroup, Report};
