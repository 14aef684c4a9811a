//! URL extraction from bookmark files
//!
//! | Extension | Format | URL location |
//! |-----------|--------|--------------|
//! | `.url` | Windows internet shortcut | rest of the `URL=` line |
//! | `.desktop` | Linux desktop entry | between `URL=` and `Icon=` |
//! | `.webloc` | macOS property list | between `<string>` and `</string>` |

use crate::ScanError;
use std::fs;
use std::path::Path;

/// Extensions (without the dot) that hold a bookmark
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["url", "desktop", "webloc"];

/// Splits `text` around `marker`, which must occur exactly once
fn halves<'a>(text: &'a str, marker: &'static str) -> Result<(&'a str, &'a str), ScanError> {
    let count = text.matches(marker).count();
    match text.split_once(marker) {
        Some(pair) if count == 1 => Ok(pair),
        _ => Err(ScanError::MalformedBookmark { marker, count }),
    }
}

/// Extracts the URL from bookmark contents
///
/// `extension` may be given with or without its leading dot.
pub fn extract_url_from_contents(data: &str, extension: &str) -> Result<String, ScanError> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    let raw = match extension.as_str() {
        "url" => {
            let (_, rest) = halves(data, "URL=")?;
            rest.lines().next().unwrap_or_default()
        }
        "desktop" => {
            let (_, rest) = halves(data, "URL=")?;
            halves(rest, "Icon=")?.0
        }
        "webloc" => {
            let (_, rest) = halves(data, "<string>")?;
            halves(rest, "</string>")?.0
        }
        _ => return Err(ScanError::UnsupportedExtension(extension)),
    };

    let url = raw.trim();
    if url.is_empty() {
        return Err(ScanError::EmptyUrl(format!(".{} bookmark", extension)));
    }
    Ok(url.to_string())
}

/// Reads a bookmark file and extracts its URL
pub fn extract_url(path: &Path) -> Result<String, ScanError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
        return Err(ScanError::UnsupportedExtension(extension.to_string()));
    }

    let data = fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.display().to_string(),
        source,
    })?;
    extract_url_from_contents(data.trim(), extension).map_err(|e| match e {
        ScanError::EmptyUrl(_) => ScanError::EmptyUrl(path.display().to_string()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const WEBLOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>URL</key>
	<string>https://mangakatana.com/manga/title.123/c45</string>
</dict>
</plist>
"#;

    #[test]
    fn test_webloc() {
        assert_eq!(
            extract_url_from_contents(WEBLOC, ".webloc").unwrap(),
            "https://mangakatana.com/manga/title.123/c45"
        );
    }

    #[test]
    fn test_url_shortcut() {
        let data = "[InternetShortcut]\r\nURL=https://a.com/chapter-7\r\nIconIndex=0\r\n";
        assert_eq!(
            extract_url_from_contents(data, "url").unwrap(),
            "https://a.com/chapter-7"
        );
    }

    #[test]
    fn test_desktop_entry() {
        let data = "[Desktop Entry]\nType=Link\nURL=https://a.com/chapter-8\nIcon=text-html\n";
        assert_eq!(
            extract_url_from_contents(data, ".desktop").unwrap(),
            "https://a.com/chapter-8"
        );
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            extract_url_from_contents("URL=https://a.com", ".txt"),
            Err(ScanError::UnsupportedExtension(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn test_markers_must_appear_once() {
        assert!(matches!(
            extract_url_from_contents("no markers here", "url"),
            Err(ScanError::MalformedBookmark { marker: "URL=", count: 0 })
        ));
        assert!(matches!(
            extract_url_from_contents("URL=a\nURL=b", "url"),
            Err(ScanError::MalformedBookmark { marker: "URL=", count: 2 })
        ));
        assert!(matches!(
            extract_url_from_contents("<string>x", "webloc"),
            Err(ScanError::MalformedBookmark { marker: "</string>", count: 0 })
        ));
    }

    #[test]
    fn test_empty_url() {
        assert!(matches!(
            extract_url_from_contents("<string>  </string>", "webloc"),
            Err(ScanError::EmptyUrl(_))
        ));
    }

    #[test]
    fn test_extract_url_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Title 45.webloc");
        fs::write(&path, WEBLOC).unwrap();
        assert_eq!(
            extract_url(&path).unwrap(),
            "https://mangakatana.com/manga/title.123/c45"
        );

        let other = dir.path().join("notes.txt");
        fs::write(&other, "hello").unwrap();
        assert!(matches!(
            extract_url(&other),
            Err(ScanError::UnsupportedExtension(_))
        ));
    }
}
