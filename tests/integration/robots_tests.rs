//! Robots.txt gate tests against a live HTTP server

use std::time::Duration;
use tapmap::robots::{build_http_client, check_robots};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA: &str = "TapMap/1.0 (internal pharma audit tool)";

fn client() -> reqwest::Client {
    build_http_client(UA, Duration::from_secs(5)).unwrap()
}

async fn server_with_robots(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_fetched_robots_allows_seed() {
    let server = server_with_robots(200, "User-agent: *\nAllow: /").await;

    let result = check_robots(&client(), &server.uri(), UA).await;

    assert!(result.found);
    assert!(result.allowed);
    assert!(result.disallowed_paths.is_empty());
}

#[tokio::test]
async fn test_fetched_robots_blocks_seed() {
    let server = server_with_robots(200, "User-agent: *\nDisallow: /").await;

    let result = check_robots(&client(), &server.uri(), UA).await;

    assert!(result.found);
    assert!(!result.allowed);
    assert_eq!(result.disallowed_paths, vec!["/"]);
    assert!(result.raw_content.as_deref().unwrap().contains("Disallow"));
}

#[tokio::test]
async fn test_disallow_elsewhere_spares_seed() {
    let server = server_with_robots(200, "User-agent: *\nDisallow: /private\nDisallow: /tmp").await;

    let result = check_robots(&client(), &server.uri(), UA).await;

    assert!(result.found);
    assert!(result.allowed);
    assert_eq!(result.disallowed_paths, vec!["/private", "/tmp"]);
}

#[tokio::test]
async fn test_missing_robots_is_permissive() {
    let server = server_with_robots(404, "Not Found").await;

    let result = check_robots(&client(), &server.uri(), UA).await;

    assert!(!result.found);
    assert!(result.allowed);
    assert!(result.raw_content.is_none());
}

#[tokio::test]
async fn test_server_error_treated_as_absent() {
    let server = server_with_robots(500, "Internal Server Error").await;

    let result = check_robots(&client(), &server.uri(), UA).await;

    assert!(!result.found);
    assert!(result.allowed);
}

#[tokio::test]
async fn test_unreachable_host_is_permissive() {
    // Port 1 is never serving HTTP; the fetch fails fast with a refusal
    let result = check_robots(&client(), "http://127.0.0.1:1/", UA).await;

    assert!(!result.found);
    assert!(result.allowed);
}
