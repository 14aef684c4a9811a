//! Chapter bump tool
//!
//! Moves a bookmark forward to a later chapter: the number in its URL is
//! rewritten in place and, unless only the URL is wanted, the number in the
//! file name too.

use crate::scan::bookmark::extract_url_from_contents;
use crate::url::split_on_number;
use crate::ScanError;
use std::fs;
use std::path::{Path, PathBuf};

/// How a bump should be performed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BumpOptions {
    /// Target chapter; `None` means "one more than the current"
    pub to: Option<f64>,

    /// Leave the file name alone
    pub url_only: bool,
}

/// Replaces the rightmost number in `text`
///
/// # Errors
///
/// `NumberNotIncreasing` if `to` is below the current number.
pub fn bump_text(text: &str, to: Option<f64>) -> Result<String, ScanError> {
    let split = split_on_number(text)?;
    let new = to.unwrap_or(split.number + 1.0);
    if new < split.number {
        return Err(ScanError::NumberNotIncreasing {
            old: split.number,
            new,
        });
    }
    Ok(split.with_number(new))
}

/// A computed but not yet applied bump
#[derive(Debug, Clone, PartialEq)]
pub struct BumpPlan {
    pub path: PathBuf,
    pub new_path: PathBuf,
    pub old_url: String,
    pub new_url: String,
    contents: String,
}

impl BumpPlan {
    /// Reads `path` and works out the new URL and file name
    pub fn for_file(path: &Path, options: BumpOptions) -> Result<Self, ScanError> {
        let io_error = |source| ScanError::Io {
            path: path.display().to_string(),
            source,
        };
        let data = fs::read_to_string(path).map_err(io_error)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let old_url = extract_url_from_contents(&data, extension)?;
        let count = data.matches(old_url.as_str()).count();
        if count != 1 {
            return Err(ScanError::MalformedBookmark {
                marker: "the bookmarked URL",
                count,
            });
        }
        let new_url = bump_text(&old_url, options.to)?;
        let contents = data.replacen(old_url.as_str(), &new_url, 1);

        let new_path = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if !options.url_only => path.with_file_name(bump_text(name, options.to)?),
            _ => path.to_path_buf(),
        };

        Ok(Self {
            path: path.to_path_buf(),
            new_path,
            old_url,
            new_url,
            contents,
        })
    }

    pub fn renames(&self) -> bool {
        self.path != self.new_path
    }

    /// Human-readable before/after summary
    pub fn describe(&self) -> String {
        let name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        format!(
            "Old: {}\n\tURL: {}\nNew: {}\n\tURL: {}",
            name(&self.path),
            self.old_url,
            name(&self.new_path),
            self.new_url
        )
    }

    /// Writes the new contents and renames the file if needed
    pub fn apply(&self) -> Result<(), ScanError> {
        fs::write(&self.path, &self.contents).map_err(|source| ScanError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        if self.renames() {
            tracing::info!("{} --> {}", self.path.display(), self.new_path.display());
            fs::rename(&self.path, &self.new_path).map_err(|source| ScanError::Io {
                path: self.new_path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
