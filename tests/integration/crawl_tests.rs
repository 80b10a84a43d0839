//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a paginated listing and its detail
//! pages, and run the full pipeline end-to-end with the HTTP navigator.

use kost_crawler::config::{Config, NavigatorKind};
use kost_crawler::crawler::DiscoveryOutcome;
use kost_crawler::output::CrawlSummary;
use kost_crawler::{run_crawl, Listing};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `listing_url` into `root`
fn create_test_config(listing_url: String, root: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.listing_url = listing_url;
    config.crawler.navigator = NavigatorKind::Http;
    config.crawler.worker_count = 2;
    config.crawler.queue_capacity = 10;
    config.crawler.time_budget = 20;
    config.http.request_timeout = 5;
    config.output.root = root.display().to_string();
    config
}

/// One listing page; an item with `None` has an anchor with an empty href
fn listing_page(items: &[Option<&str>], next: Option<&str>) -> String {
    let mut body = String::from("<html><body><div id=\"listings\">");
    for item in items {
        body.push_str(&format!(
            r#"<div class="item"><div class="picture"><a href="{}">Kost</a></div></div>"#,
            item.unwrap_or("")
        ));
    }
    body.push_str("</div>");
    if let Some(next) = next {
        body.push_str(&format!(
            r#"<div id="controller_area"><ul><li class="navigator rs"><a href="{}">Next</a></li></ul></div>"#,
            next
        ));
    }
    body.push_str("</body></html>");
    body
}

fn detail_page(title: &str, city: &str) -> String {
    format!(
        r#"<html><body>
        <h1> {title} </h1>
        <div class="price-tag">Rp 1.200.000</div>
        <div class="location">
            <div class="table-cell clearfix"><div class="name" title="Provinsi"></div><div class="value">DI Yogyakarta</div></div>
            <div class="table-cell clearfix"><div class="name" title="Kota"></div><div class="value"> {city} </div></div>
        </div>
        <div id="df_field_additional_information"><div class="value">Dekat kampus</div></div>
        <div class="common row">
            <div class="table-cell clearfix"><div class="name" title="Jenis Kost"></div><div class="value">Putri</div></div>
            <div class="table-cell clearfix"><div class="name" title="Free WiFi"></div><div class="value">Ya</div></div>
            <div class="table-cell clearfix"><div class="name" title="AC"></div><div class="value">Tidak</div></div>
        </div>
        </body></html>"#
    )
}

async fn serve_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

fn dated_dir(root: &Path) -> std::path::PathBuf {
    root.join(chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string())
}

fn record_names(summary: &CrawlSummary) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(&summary.output_dir)
        .expect("Failed to read output dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn read_record(summary: &CrawlSummary, name: &str) -> Listing {
    let content = std::fs::read_to_string(summary.output_dir.join(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn test_two_page_listing_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/listing/1",
        listing_page(
            &[Some("/kost/melati-1.html"), None, Some("/kost/mawar-2.html")],
            Some("/listing/2"),
        ),
    )
    .await;
    serve_html(
        &server,
        "/listing/2",
        listing_page(&[Some("/kost/anggrek-3.html")], None),
    )
    .await;
    serve_html(&server, "/kost/melati-1.html", detail_page("Kost Melati", "Sleman")).await;
    serve_html(&server, "/kost/mawar-2.html", detail_page("Kost Mawar", "Bantul")).await;
    serve_html(&server, "/kost/anggrek-3.html", detail_page("Kost Anggrek", "Depok")).await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/listing/1", base), temp_dir.path());
    config.crawler.worker_count = 1;
    config.crawler.queue_capacity = 2;

    let summary = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(summary.discovery.outcome, DiscoveryOutcome::Exhausted);
    assert_eq!(summary.discovery.pages_visited, 2);
    assert_eq!(summary.discovery.enqueued, 3);
    assert_eq!(summary.discovery.skipped_empty, 1);
    assert_eq!(summary.workers.persisted, 3);
    assert_eq!(summary.workers.failed, 0);
    assert_eq!(summary.output_dir, dated_dir(temp_dir.path()));
    assert_eq!(
        record_names(&summary),
        vec!["anggrek-3.json", "mawar-2.json", "melati-1.json"]
    );

    let melati = read_record(&summary, "melati-1.json");
    assert_eq!(melati.url(), format!("{}/kost/melati-1.html", base));
    assert_eq!(melati.title, "Kost Melati");
    assert_eq!(melati.rent_price, "Rp 1.200.000");
    assert_eq!(melati.description, "Dekat kampus");
    assert_eq!(melati.location.province, "DI Yogyakarta");
    assert_eq!(melati.location.city, "Sleman");
    assert_eq!(melati.category, "Putri");
    assert!(melati.has_wifi);
    assert!(!melati.has_air_conditioning);
    assert!(!melati.has_private_bathroom);
}

#[tokio::test]
async fn test_record_json_layout() {
    let server = MockServer::start().await;

    serve_html(
        &server,
        "/listing/1",
        listing_page(&[Some("/kost/melati-1.html")], None),
    )
    .await;
    serve_html(&server, "/kost/melati-1.html", detail_page("Kost Melati", "Sleman")).await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/listing/1", server.uri()), temp_dir.path());
    let summary = run_crawl(config).await.unwrap();

    let content = std::fs::read_to_string(summary.output_dir.join("melati-1.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(value["kota"], "Sleman");
    assert_eq!(value["provinsi"], "DI Yogyakarta");
    assert_eq!(value["jenis_kost"], "Putri");
    assert_eq!(value["free_wifi"], true);
    assert!(value.get("has_ac").is_none());
    assert!(value.get("alamat").is_none());
    assert!(content.contains("\n  \"title\""), "record should be indented");
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;

    serve_html(
        &server,
        "/listing/1",
        listing_page(
            &[Some("/kost/melati-1.html"), Some("/kost/melati-1.html")],
            Some("/listing/2"),
        ),
    )
    .await;
    serve_html(
        &server,
        "/listing/2",
        listing_page(&[Some("/kost/melati-1.html"), Some("/kost/mawar-2.html")], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/kost/melati-1.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(detail_page("Kost Melati", "Sleman"), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    serve_html(&server, "/kost/mawar-2.html", detail_page("Kost Mawar", "Bantul")).await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/listing/1", server.uri()), temp_dir.path());
    let summary = run_crawl(config).await.unwrap();

    assert_eq!(summary.discovery.enqueued, 2);
    assert_eq!(summary.discovery.skipped_duplicate, 2);
    assert_eq!(summary.workers.processed, 2);
    assert_eq!(record_names(&summary), vec!["mawar-2.json", "melati-1.json"]);
}

#[tokio::test]
async fn test_failed_detail_page_does_not_abort_run() {
    let server = MockServer::start().await;

    serve_html(
        &server,
        "/listing/1",
        listing_page(
            &[
                Some("/kost/melati-1.html"),
                Some("/kost/rusak-2.html"),
                Some("/kost/mawar-3.html"),
            ],
            None,
        ),
    )
    .await;
    serve_html(&server, "/kost/melati-1.html", detail_page("Kost Melati", "Sleman")).await;
    Mock::given(method("GET"))
        .and(path("/kost/rusak-2.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    serve_html(&server, "/kost/mawar-3.html", detail_page("Kost Mawar", "Bantul")).await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/listing/1", server.uri()), temp_dir.path());
    let summary = run_crawl(config).await.unwrap();

    assert_eq!(summary.workers.processed, 3);
    assert_eq!(summary.workers.persisted, 2);
    assert_eq!(summary.workers.failed, 1);
    assert_eq!(record_names(&summary), vec!["mawar-3.json", "melati-1.json"]);
}

#[tokio::test]
async fn test_time_budget_stops_discovery_and_keeps_queued_work() {
    let server = MockServer::start().await;

    serve_html(
        &server,
        "/listing/1",
        listing_page(
            &[Some("/kost/melati-1.html"), Some("/kost/mawar-2.html")],
            Some("/listing/2"),
        ),
    )
    .await;
    // The second listing page never answers within the budget
    Mock::given(method("GET"))
        .and(path("/listing/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(listing_page(&[Some("/kost/anggrek-3.html")], None), "text/html")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;
    serve_html(&server, "/kost/melati-1.html", detail_page("Kost Melati", "Sleman")).await;
    serve_html(&server, "/kost/mawar-2.html", detail_page("Kost Mawar", "Bantul")).await;

    let temp_dir = TempDir::new().unwrap();
    let mut config = create_test_config(format!("{}/listing/1", server.uri()), temp_dir.path());
    config.crawler.time_budget = 1;
    config.http.request_timeout = 60;

    let summary = tokio::time::timeout(Duration::from_secs(15), run_crawl(config))
        .await
        .expect("Run should return soon after the budget expires")
        .unwrap();

    assert_eq!(summary.discovery.outcome, DiscoveryOutcome::Cancelled);
    assert_eq!(summary.discovery.pages_visited, 1);
    assert_eq!(summary.workers.persisted, 2);
    assert_eq!(record_names(&summary), vec!["mawar-2.json", "melati-1.json"]);
}

#[tokio::test]
async fn test_listing_failure_ends_run_cleanly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(format!("{}/listing/1", server.uri()), temp_dir.path());
    let summary = run_crawl(config).await.unwrap();

    assert!(matches!(summary.discovery.outcome, DiscoveryOutcome::Failed(_)));
    assert_eq!(summary.discovery.pages_visited, 0);
    assert_eq!(summary.workers.processed, 0);
    assert!(summary.output_dir.is_dir());
    assert!(record_names(&summary).is_empty());
}

#[tokio::test]
async fn test_unwritable_output_root_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let config = create_test_config("http://127.0.0.1:1/listing/1".to_string(), &blocker);
    let result = run_crawl(config).await;

    assert!(matches!(
        result,
        Err(kost_crawler::CrawlError::OutputDir { .. })
    ));
}
