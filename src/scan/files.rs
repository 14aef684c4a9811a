//! Recursive directory listing for bookmark folders

use crate::ScanError;
use std::fs;
use std::path::{Path, PathBuf};

/// File names that are never bookmarks
pub const IGNORED_FILES: &[&str] = &[".DS_Store"];

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ScanError + '_ {
    move |source| ScanError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Lists every regular file under `dir`, recursively
///
/// Paths are absolute and sorted. OS artifacts like `.DS_Store` are left out.
/// Symlinked directories are not descended into.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let root = dir.canonicalize().map_err(io_error(dir))?;
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.display().to_string()));
    }

    let mut files = Vec::new();
    let mut pending = vec![root];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).map_err(io_error(&current))? {
            let entry = entry.map_err(io_error(&current))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(io_error(&path))?;

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            let ignored = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| IGNORED_FILES.contains(&name));
            if ignored || !path.is_file() {
                continue;
            }

            files.push(path.canonicalize().map_err(io_error(&path))?);
        }
    }

    files.sort();
    tracing::debug!("Found {} file(s) under {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_lists_nested_files_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/deeper")).unwrap();
        fs::write(dir.path().join("z.url"), "").unwrap();
        fs::write(dir.path().join("b/a.webloc"), "").unwrap();
        fs::write(dir.path().join("b/deeper/c.desktop"), "").unwrap();
        fs::write(dir.path().join("b/.DS_Store"), "").unwrap();

        let files = list_files(dir.path()).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            files,
            vec![
                root.join("b/a.webloc"),
                root.join("b/deeper/c.desktop"),
                root.join("z.url"),
            ]
        );
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(list_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_file_and_missing_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("x.url");
        fs::write(&file, "").unwrap();

        assert!(matches!(list_files(&file), Err(ScanError::NotADirectory(_))));
        assert!(matches!(
            list_files(&dir.path().join("missing")),
            Err(ScanError::Io { .. })
        ));
    }
}
