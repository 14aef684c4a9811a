//! Full check runs over a bookmark directory

use crate::site_key;
use chapter_scout::config::{Config, ProbeConfig};
use chapter_scout::output::Report;
use chapter_scout::probe::run_check;
use chapter_scout::sites::{AlwaysFound, MarkerDetector};
use chapter_scout::{SiteRegistry, StatusKind, TrackedUrl};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    Config {
        probe: ProbeConfig {
            timeout_secs: 5,
            max_retries: 0,
            step_pause_ms: 0,
            ..ProbeConfig::default()
        },
        ..Config::default()
    }
}

fn marker_detector() -> MarkerDetector {
    MarkerDetector::new(
        vec!["PREV CHAPTER".to_string()],
        vec!["moveToListChapter".to_string()],
    )
}

fn write_bookmark(dir: &Path, name: &str, url: &str) {
    fs::write(
        dir.join(format!("{}.url", name)),
        format!("[InternetShortcut]\nURL={}\n", url),
    )
    .unwrap();
}

fn kind_of(urls: &[TrackedUrl], url: &str) -> StatusKind {
    urls.iter()
        .find(|t| t.url() == url)
        .map(TrackedUrl::kind)
        .unwrap_or_else(|| panic!("{} missing from results", url))
}

/// Three sites: one dead, one fully up to date, one missing the bookmarked chapter
async fn start_sites() -> (MockServer, MockServer, MockServer, SiteRegistry) {
    let dead = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&dead)
        .await;

    let live = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a>PREV CHAPTER</a>"))
        .mount(&live)
        .await;

    let gappy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manga/title/chapter-21"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a>PREV CHAPTER</a>"))
        .mount(&gappy)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moveToListChapter"))
        .mount(&gappy)
        .await;

    let mut registry = SiteRegistry::new();
    registry.register(site_key(&dead), AlwaysFound).unwrap();
    registry.register(site_key(&live), marker_detector()).unwrap();
    registry.register(site_key(&gappy), marker_detector()).unwrap();

    (dead, live, gappy, registry)
}

#[tokio::test]
async fn test_full_check_classifies_each_site() {
    let (dead, live, gappy, registry) = start_sites().await;
    let dir = tempdir().unwrap();

    let dead_url = format!("{}/manga/title/chapter-20", dead.uri());
    let live_url = format!("{}/manga/title/chapter-20", live.uri());
    let gappy_url = format!("{}/manga/title/chapter-20", gappy.uri());
    let tiny_url = format!("{}/manga/other/chapter-2", live.uri());
    let unknown_url = "https://unregistered.example/manga/title/chapter-20";

    write_bookmark(dir.path(), "dead", &dead_url);
    write_bookmark(dir.path(), "live", &live_url);
    write_bookmark(dir.path(), "gappy", &gappy_url);
    write_bookmark(dir.path(), "tiny", &tiny_url);
    write_bookmark(dir.path(), "unknown", unknown_url);

    let run = run_check(
        &test_config(),
        registry,
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(run.is_complete());
    let urls = &run.report.urls;
    assert_eq!(urls.len(), 5);
    assert_eq!(kind_of(urls, &dead_url), StatusKind::Broken);
    assert_eq!(kind_of(urls, &live_url), StatusKind::Success);
    assert_eq!(kind_of(urls, &gappy_url), StatusKind::Missing);
    assert_eq!(kind_of(urls, &tiny_url), StatusKind::Tiny);
    assert_eq!(kind_of(urls, unknown_url), StatusKind::Unknown);

    let report = Report::new(urls);
    let open: Vec<StatusKind> = report.open_groups().iter().map(|g| g.kind).collect();
    assert_eq!(
        open,
        vec![StatusKind::Broken, StatusKind::Missing, StatusKind::Tiny]
    );
    assert!(report.render_errors().contains(unknown_url));
}

#[tokio::test]
async fn test_skipped_site_is_not_contacted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut registry = SiteRegistry::new();
    registry.register(site_key(&server), AlwaysFound).unwrap();

    let dir = tempdir().unwrap();
    let url = format!("{}/manga/title/chapter-20", server.uri());
    write_bookmark(dir.path(), "skipped", &url);

    let mut config = test_config();
    config.skip_domains.push(site_key(&server));

    let run = run_check(&config, registry, dir.path(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(kind_of(&run.report.urls, &url), StatusKind::Skipped);
}

#[tokio::test]
async fn test_unreadable_bookmarks_make_run_incomplete() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.webloc"), "<plist></plist>").unwrap();
    write_bookmark(dir.path(), "tiny", "https://a.com/chapter-1");

    let run = run_check(
        &test_config(),
        SiteRegistry::new(),
        dir.path(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(run.scan_failures.len(), 1);
    assert_eq!(run.report.urls.len(), 1);
    assert!(!run.is_complete());
}

#[tokio::test]
async fn test_cancelled_run_lists_everything_untested() {
    let (dead, live, gappy, registry) = start_sites().await;
    let dir = tempdir().unwrap();
    for (name, server) in [("dead", &dead), ("live", &live), ("gappy", &gappy)] {
        write_bookmark(
            dir.path(),
            name,
            &format!("{}/manga/title/chapter-20", server.uri()),
        );
    }

    let token = CancellationToken::new();
    token.cancel();
    let run = run_check(&test_config(), registry, dir.path(), &token)
        .await
        .unwrap();

    assert!(run.report.cancelled);
    assert_eq!(run.report.untested().count(), 3);
    assert!(!run.is_complete());
    assert!(Report::new(&run.report.urls)
        .render_untested()
        .starts_with("3 URL(s) were not tested:"));
}
