//! Bookmark directory scanning and editing

pub mod bookmark;
pub mod files;
pub mod increment;

pub use bookmark::{extract_url, extract_url_from_contents, SUPPORTED_EXTENSIONS};
pub use files::list_files;
pub use increment::{bump_text, BumpOptions, BumpPlan};
