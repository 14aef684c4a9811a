//! Grouped, human-readable result listing
//!
//! Results are split by family. NoOpen outcomes are printed first inside an
//! "Errors" banner, one block per kind. ToOpen outcomes come out in a fixed
//! priority order and are what the opener works through.

use crate::config::OpenConfig;
use crate::probe::ScanFailure;
use crate::state::{Family, StatusKind, TrackedUrl};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Width of the `*` banners around the error listing
pub const BANNER_WIDTH: usize = 70;

/// Three-line `*` banner with `title` centred
pub fn banner(title: &str) -> String {
    let rule = "*".repeat(BANNER_WIDTH);
    format!(
        "{rule}\n*{title:^width$}*\n{rule}\n",
        rule = rule,
        title = title,
        width = BANNER_WIDTH - 2
    )
}

/// One line per entry: the URL, plus the error for kinds that carry one
pub fn format_entry(tracked: &TrackedUrl) -> String {
    match tracked.status().error() {
        Some(error) => format!("{}: {}", tracked.url(), error),
        None => tracked.url().to_string(),
    }
}

fn render_block(heading: &str, lines: impl IntoIterator<Item = String>) -> String {
    let mut block = String::from(heading);
    for line in lines {
        block.push_str("\n\t");
        block.push_str(&line);
    }
    block.push('\n');
    block
}

/// Which ToOpen kinds the user asked to leave closed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenFilter {
    skipped: BTreeSet<StatusKind>,
}

impl OpenFilter {
    pub fn new(kinds: impl IntoIterator<Item = StatusKind>) -> Self {
        Self {
            skipped: kinds.into_iter().collect(),
        }
    }

    pub fn from_config(config: &OpenConfig) -> Self {
        Self::new(config.skip_kinds.iter().copied())
    }

    pub fn skips(&self, kind: StatusKind) -> bool {
        self.skipped.contains(&kind)
    }

    /// The notice printed in place of a skipped group
    pub fn skip_notice(&self, kind: StatusKind) -> Option<String> {
        if !self.skips(kind) {
            return None;
        }
        Some(match kind {
            StatusKind::Tiny => "Skipping tiny".to_string(),
            StatusKind::PointFive => "Skipping .5".to_string(),
            other => format!("Skipping {}", other),
        })
    }
}

/// ToOpen URLs of a single kind
#[derive(Debug)]
pub struct OpenGroup<'a> {
    pub kind: StatusKind,
    pub urls: Vec<&'a TrackedUrl>,
}

impl OpenGroup<'_> {
    pub fn render(&self) -> String {
        render_block(&self.kind.heading(), self.urls.iter().map(|t| format_entry(t)))
    }
}

/// View over the final list of tracked URLs
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    urls: &'a [TrackedUrl],
}

impl<'a> Report<'a> {
    pub fn new(urls: &'a [TrackedUrl]) -> Self {
        Self { urls }
    }

    /// Entries of `kind`, sorted by URL
    pub fn of_kind(&self, kind: StatusKind) -> Vec<&'a TrackedUrl> {
        let mut matching: Vec<&TrackedUrl> =
            self.urls.iter().filter(|t| t.kind() == kind).collect();
        matching.sort_by(|a, b| a.url().cmp(b.url()));
        matching
    }

    /// Kinds present in `family`
    pub fn kinds_in(&self, family: Family) -> BTreeSet<StatusKind> {
        self.urls
            .iter()
            .map(TrackedUrl::kind)
            .filter(|kind| kind.family() == family)
            .collect()
    }

    pub fn count(&self, family: Family) -> usize {
        self.urls.iter().filter(|t| t.status().family() == family).count()
    }

    /// Bannered listing of every NoOpen entry, or an empty string
    pub fn render_errors(&self) -> String {
        let kinds = self.kinds_in(Family::NoOpen);
        if kinds.is_empty() {
            return String::new();
        }

        let mut out = banner("Errors");
        for kind in kinds {
            out.push('\n');
            let entries = self.of_kind(kind).into_iter().map(format_entry);
            out.push_str(&render_block(&kind.heading(), entries));
        }
        out.push('\n');
        out.push_str(&banner("Done"));
        out
    }

    /// Listing of URLs that were never checked, or an empty string
    pub fn render_untested(&self) -> String {
        let untested = self.of_kind(StatusKind::Untested);
        if untested.is_empty() {
            return String::new();
        }
        render_block(
            &format!("{} URL(s) were not tested:", untested.len()),
            untested.into_iter().map(|t| t.url().to_string()),
        )
    }

    /// ToOpen groups in display order, empty groups left out
    pub fn open_groups(&self) -> Vec<OpenGroup<'a>> {
        StatusKind::OPEN_ORDER
            .into_iter()
            .map(|kind| OpenGroup {
                kind,
                urls: self.of_kind(kind),
            })
            .filter(|group| !group.urls.is_empty())
            .collect()
    }

    /// One-line tally of outcomes by kind
    pub fn summary_line(&self) -> String {
        let mut kinds: Vec<StatusKind> = self.urls.iter().map(TrackedUrl::kind).collect();
        kinds.sort();
        kinds.dedup();

        let mut line = format!("{} URL(s):", self.urls.len());
        for kind in kinds {
            let n = self.urls.iter().filter(|t| t.kind() == kind).count();
            let _ = write!(line, " {}={}", kind, n);
        }
        line
    }
}

/// Listing of bookmarks that could not be read, or an empty string
pub fn render_scan_failures(failures: &[ScanFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&ScanFailure> = failures.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));
    render_block(
        "Unreadable bookmarks",
        sorted
            .into_iter()
            .map(|f| format!("{}: {}", f.path.display(), f.error)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Status;
    use crate::ProbeError;

    fn resolved(url: &str, status: Status) -> TrackedUrl {
        let mut tracked = TrackedUrl::new(url).unwrap();
        if status.is_terminal() {
            tracked.resolve(status);
        }
        tracked
    }

    fn sample() -> Vec<TrackedUrl> {
        vec![
            resolved("https://z.com/chapter-3", Status::Tiny),
            resolved("https://b.com/chapter-40", Status::Broken),
            resolved("https://a.com/chapter-40", Status::Broken),
            resolved("https://c.com/chapter-9", Status::Unknown),
            resolved(
                "https://d.com/chapter-9",
                Status::BadRequest(ProbeError::Timeout {
                    url: "https://d.com/chapter-9".to_string(),
                    attempts: 9,
                }),
            ),
            resolved("https://e.com/chapter-9", Status::Skipped),
            resolved("https://f.com/chapter-9", Status::Success),
            resolved("https://g.com/chapter-9", Status::Untested),
        ]
    }

    #[test]
    fn test_banner() {
        let banner = banner("Errors");
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == BANNER_WIDTH));
        assert!(lines[1].starts_with('*') && lines[1].ends_with('*'));
        assert!(lines[1].contains("Errors"));
    }

    #[test]
    fn test_open_groups_follow_priority_order() {
        let urls = sample();
        let report = Report::new(&urls);
        let groups = report.open_groups();

        let kinds: Vec<StatusKind> = groups.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![StatusKind::Broken, StatusKind::Tiny]);

        let broken: Vec<&str> = groups[0].urls.iter().map(|t| t.url()).collect();
        assert_eq!(
            broken,
            vec!["https://a.com/chapter-40", "https://b.com/chapter-40"]
        );
    }

    #[test]
    fn test_error_listing() {
        let urls = sample();
        let errors = Report::new(&urls).render_errors();

        assert!(errors.contains("Skipped: This domain was skipped\n\thttps://e.com/chapter-9"));
        assert!(errors.contains("\nBadRequest\n\thttps://d.com/chapter-9: Request to"));
        assert!(errors.contains("Unknown: "));
        assert!(!errors.contains("f.com"));
        assert!(!errors.contains("a.com"));
        // Skipped is listed before the probing failures
        assert!(errors.find("Skipped").unwrap() < errors.find("Unknown").unwrap());
    }

    #[test]
    fn test_no_errors_renders_nothing() {
        let urls = vec![resolved("https://f.com/chapter-9", Status::Success)];
        let report = Report::new(&urls);
        assert!(report.render_errors().is_empty());
        assert!(report.render_untested().is_empty());
        assert!(report.open_groups().is_empty());
    }

    #[test]
    fn test_untested_listing() {
        let urls = sample();
        let listing = Report::new(&urls).render_untested();
        assert_eq!(listing, "1 URL(s) were not tested:\n\thttps://g.com/chapter-9\n");
    }

    #[test]
    fn test_open_filter() {
        let filter = OpenFilter::new([StatusKind::Tiny, StatusKind::Broken]);
        assert_eq!(
            filter.skip_notice(StatusKind::Tiny).as_deref(),
            Some("Skipping tiny")
        );
        assert_eq!(
            filter.skip_notice(StatusKind::Broken).as_deref(),
            Some("Skipping Broken")
        );
        assert_eq!(filter.skip_notice(StatusKind::PointFive), None);
        assert_eq!(filter.skip_notice(StatusKind::Missing), None);

        let filter = OpenFilter::new([StatusKind::PointFive]);
        assert_eq!(
            filter.skip_notice(StatusKind::PointFive).as_deref(),
            Some("Skipping .5")
        );
    }

    #[test]
    fn test_open_filter_from_config() {
        let mut config = OpenConfig::default();
        assert_eq!(OpenFilter::from_config(&config), OpenFilter::default());

        config.skip_kinds = vec![StatusKind::Exists, StatusKind::Missing];
        let filter = OpenFilter::from_config(&config);
        assert!(filter.skips(StatusKind::Exists));
        assert!(filter.skips(StatusKind::Missing));
        assert!(!filter.skips(StatusKind::Broken));
    }

    #[test]
    fn test_summary_line() {
        let urls = sample();
        let line = Report::new(&urls).summary_line();
        assert!(line.starts_with("8 URL(s):"));
        assert!(line.contains("Broken=2"));
    }
}
