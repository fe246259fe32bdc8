//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the directory site and run
//! the full login, listing, worker, and output cycle end-to-end.

use franchise_harvest::config::HarvestConfig;
use franchise_harvest::crawler::{Coordinator, Credentials};
use franchise_harvest::{AuthError, HarvestError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_FORM: &str = r#"<html><body><form action="/login" method="post">
    <input type="hidden" name="_csrf" value="csrf-token-1">
    <input type="text" name="Login[username]">
    <input type="password" name="Login[password]">
</form></body></html>"#;

const SESSION_COOKIE: &str = "PHPSESSID=session-1";

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, output: &Path) -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.site.base_url = base_url.to_string();
    config.site.timeout_secs = 5.0;
    config.crawl.workers = 3;
    config.crawl.poll_interval_secs = 0.05;
    config.output.path = output.to_path_buf();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn listing_page(count: &str, item: &str) -> ResponseTemplate {
    html(&format!(
        r#"<p class="franchise-category__list-count">{}</p>
        <div class="fr-item"><a class="fr-item__link-name" href="{}">Franchise</a></div>"#,
        count, item
    ))
}

fn detail_page(go: &str) -> ResponseTemplate {
    html(&format!(
        r#"<h1>Franchise</h1><a class="website linkForReg need-auth" href="{}">Website</a>"#,
        go
    ))
}

fn contact_page(emails: &[&str]) -> ResponseTemplate {
    let anchors: String = emails
        .iter()
        .map(|e| format!(r#"<a href="mailto:{}">{}</a>"#, e, e))
        .collect();
    html(&anchors)
}

async fn mount_get(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Detail pages only answer requests carrying the logged-in session cookie
async fn mount_session_detail(server: &MockServer, at: &str, go: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .and(header("cookie", SESSION_COOKIE))
        .respond_with(detail_page(go))
        .expect(1..)
        .mount(server)
        .await;
}

async fn mount_successful_login(server: &MockServer) {
    mount_get(server, "/login", html(LOGIN_FORM)).await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("_csrf=csrf-token-1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/")
                .insert_header("Set-Cookie", format!("{}; Path=/", SESSION_COOKIE).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;

    mount_get(server, "/", html("Welcome back")).await;
}

fn read_lines(path: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(path).expect("output file should exist");
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    lines.sort();
    lines
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_harvest_deduplicates_across_items() {
    let mock_server = MockServer::start().await;
    mount_successful_login(&mock_server).await;

    // Two listing pages with one item each: 1 per page, 2 in total
    mount_get(
        &mock_server,
        "/franchise/all/1",
        listing_page("Показано франшиз: 1 из 2", "/franchise/coffee"),
    )
    .await;
    mount_get(
        &mock_server,
        "/franchise/all/2",
        listing_page("Показано франшиз: 1 из 2", "/franchise/bakery"),
    )
    .await;

    mount_session_detail(&mock_server, "/franchise/coffee", "/go/coffee").await;
    mount_session_detail(&mock_server, "/franchise/bakery", "/go/bakery").await;

    // Gated links redirect to the franchisors' contact pages
    Mock::given(method("GET"))
        .and(path("/go/coffee"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/contacts/coffee"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/go/bakery"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/contacts/bakery"))
        .mount(&mock_server)
        .await;

    mount_get(
        &mock_server,
        "/contacts/coffee",
        contact_page(&["sales@coffee.example", "hr@coffee.example", "partners@group.example"]),
    )
    .await;
    mount_get(
        &mock_server,
        "/contacts/bakery",
        contact_page(&["sales@bakery.example", "partners@group.example"]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("emails.txt");
    std::fs::write(&output, "stale@old.example\n").unwrap();

    let config = create_test_config(&mock_server.uri(), &output);
    let coordinator = Coordinator::new(config, Credentials::new("alice", "secret"))
        .expect("Failed to create coordinator");

    let summary = coordinator.run().await.expect("Harvest should succeed");

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.items_enqueued, 2);
    assert_eq!(summary.items_processed, 2);
    assert_eq!(summary.items_failed, 0);
    assert_eq!(summary.emails_collected, 4);

    assert_eq!(
        read_lines(&output),
        vec![
            "hr@coffee.example",
            "partners@group.example",
            "sales@bakery.example",
            "sales@coffee.example",
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_distinct_emails_from_two_items() {
    let mock_server = MockServer::start().await;
    mount_successful_login(&mock_server).await;

    mount_get(
        &mock_server,
        "/franchise/all/1",
        listing_page("Показано франшиз: 1 из 2", "/franchise/a"),
    )
    .await;
    mount_get(
        &mock_server,
        "/franchise/all/2",
        listing_page("Показано франшиз: 1 из 2", "/franchise/b"),
    )
    .await;
    mount_get(&mock_server, "/franchise/a", detail_page("/contacts/a")).await;
    mount_get(&mock_server, "/franchise/b", detail_page("/contacts/b")).await;

    // Each page: two distinct addresses, one of them shared with the other page
    mount_get(
        &mock_server,
        "/contacts/a",
        contact_page(&["one@example.com", "shared@example.com"]),
    )
    .await;
    mount_get(
        &mock_server,
        "/contacts/b",
        contact_page(&["two@example.com", "shared@example.com"]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("emails.txt");
    let config = create_test_config(&mock_server.uri(), &output);

    let summary = Coordinator::new(config, Credentials::new("alice", "secret"))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.emails_collected, 3);
    assert_eq!(
        read_lines(&output),
        vec!["one@example.com", "shared@example.com", "two@example.com"]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_broken_items_and_pages_do_not_stop_the_run() {
    let mock_server = MockServer::start().await;
    mount_successful_login(&mock_server).await;

    // Page 1 reports three pages; page 2 is broken
    mount_get(
        &mock_server,
        "/franchise/all/1",
        listing_page("Показано франшиз: 1 из 3", "/franchise/no-link"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/franchise/all/2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_get(
        &mock_server,
        "/franchise/all/3",
        listing_page("Показано франшиз: 1 из 3", "/franchise/good"),
    )
    .await;

    mount_get(&mock_server, "/franchise/no-link", html("<p>No website listed</p>")).await;
    mount_get(&mock_server, "/franchise/good", detail_page("/contacts/good")).await;
    mount_get(&mock_server, "/contacts/good", contact_page(&["good@example.com"])).await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("emails.txt");
    let config = create_test_config(&mock_server.uri(), &output);

    let summary = Coordinator::new(config, Credentials::new("alice", "secret"))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.items_processed, 2);
    assert_eq!(summary.items_failed, 1);
    assert_eq!(read_lines(&output), vec!["good@example.com"]);
}

#[tokio::test]
async fn test_rejected_login_aborts_before_crawling() {
    let mock_server = MockServer::start().await;
    mount_get(&mock_server, "/login", html(LOGIN_FORM)).await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(&mock_server)
        .await;

    // No listing page may be requested
    Mock::given(method("GET"))
        .and(path_regex(r"^/franchise/.*"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("emails.txt");
    let config = create_test_config(&mock_server.uri(), &output);

    let result = Coordinator::new(config, Credentials::new("alice", "wrong"))
        .unwrap()
        .run()
        .await;

    assert!(matches!(
        result,
        Err(HarvestError::Auth(AuthError::InvalidCredentials))
    ));
    assert!(!output.exists(), "no output is written after a failed login");
}

#[tokio::test]
async fn test_empty_listing_writes_empty_file() {
    let mock_server = MockServer::start().await;
    mount_successful_login(&mock_server).await;

    mount_get(
        &mock_server,
        "/franchise/food/1",
        html(r#"<p class="franchise-category__list-count">Показано франшиз: 10 из 0</p>"#),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("emails.txt");
    let mut config = create_test_config(&mock_server.uri(), &output);
    config.crawl.topic = "food".to_string();

    let summary = Coordinator::new(config, Credentials::new("alice", "secret"))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.emails_collected, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}
