//! Integration tests for Chapter-Scout
//!
//! These tests use wiremock to stand in for manga sites and run the prober
//! and the full check cycle against them.

mod check_tests;
mod probe_tests;

use chapter_scout::registrable_domain;
use wiremock::MockServer;

/// Bucket key of a mock server (`127.0.0.1:<port>`)
pub fn site_key(server: &MockServer) -> String {
    registrable_domain(&server.uri()).expect("mock server URI has a host")
}
