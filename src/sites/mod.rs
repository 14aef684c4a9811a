//! Chapter detectors, keyed by registrable domain
//!
//! Detection is plain substring matching over the raw page body. The table of
//! which markers mean "chapter found" on which site is data, shipped as
//! `builtin.toml` and extendable from the configuration file.

mod detector;
mod registry;

pub use detector::{AlwaysFound, ChapterDetector, MarkerDetector};
pub use registry::SiteRegistry;
