//! State tracking for checked bookmarks
//!
//! This module defines the classification outcomes and the per-bookmark entry
//! that carries one.

pub mod status;
pub mod tracked;

pub use status::{Family, Status, StatusKind};
pub use tracked::TrackedUrl;
