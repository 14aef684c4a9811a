//! URL handling module for Chapter-Scout
//!
//! This module provides registrable-domain extraction (the key URLs are
//! bucketed and looked up by) and the chapter number codec.

mod chapter;
mod domain;

// Re-export main functions
pub use chapter::{render_number, split_on_number, split_on_number_with, ChapterSplit};
pub use domain::{domain_key, registrable_domain};
