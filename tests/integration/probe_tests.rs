//! HTTP probing against mock sites

use crate::site_key;
use chapter_scout::probe::{ChapterSource, Fetcher, ProbeOutcome, RetryPolicy, SiteProber};
use chapter_scout::sites::MarkerDetector;
use chapter_scout::{ProbeError, SiteRegistry};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_fetcher(timeout: Duration, max_retries: u32) -> Fetcher {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build client");
    Fetcher::new(client, RetryPolicy::new(max_retries, Duration::from_millis(5)))
}

fn marker_detector() -> MarkerDetector {
    MarkerDetector::new(
        vec!["PREV CHAPTER".to_string()],
        vec!["moveToListChapter".to_string()],
    )
}

#[tokio::test]
async fn test_timeouts_succeed_on_last_allowed_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("slow")
                .set_delay(Duration::from_millis(800)),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&server)
        .await;

    // Two timeouts, two retries allowed
    let outcome = quick_fetcher(Duration::from_millis(200), 2)
        .probe(&format!("{}/chapter-1", server.uri()))
        .await
        .unwrap();

    assert_eq!(outcome, ProbeOutcome::Page("fast".to_string()));
}

#[tokio::test]
async fn test_timeouts_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let err = quick_fetcher(Duration::from_millis(100), 2)
        .probe(&format!("{}/chapter-1", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ProbeError::Timeout { attempts: 3, .. }),
        "unexpected error: {}",
        err
    );
}

#[tokio::test]
async fn test_site_prober_runs_detector() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/title/chapter-11"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a>PREV CHAPTER</a>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/title/chapter-12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("PREV CHAPTER moveToListChapter"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut registry = SiteRegistry::new();
    registry.register(site_key(&server), marker_detector()).unwrap();
    let prober = SiteProber::new(
        quick_fetcher(Duration::from_secs(5), 0),
        Arc::new(registry),
    );

    let base = server.uri();
    assert!(prober
        .chapter_found(&format!("{}/title/chapter-11", base))
        .await
        .unwrap());
    assert!(!prober
        .chapter_found(&format!("{}/title/chapter-12", base))
        .await
        .unwrap());
    assert!(!prober
        .chapter_found(&format!("{}/title/chapter-13", base))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_unknown_site_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let prober = SiteProber::new(
        quick_fetcher(Duration::from_secs(5), 0),
        Arc::new(SiteRegistry::new()),
    );

    let err = prober
        .chapter_found(&format!("{}/title/chapter-11", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::UnknownDomain { .. }));
}
