//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including the HTTP download surface.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use course_harvest::catalog::Catalog;
use course_harvest::config::{parse_config, Config};
use course_harvest::crawler::{crawl_category, Orchestrator};
use course_harvest::server::{routes, AppState};
use course_harvest::{encode_csv, FailureKind, HarvestError};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, extra: &str) -> Config {
    let content = format!(
        r##"
[crawler]
max-concurrent-fetches = 3
fetch-timeout = 1000

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

{extra}

[site]
base-url = "{base_url}"
link-selector = "a.CardText-link"

[[category]]
path = "/browse/data-science"

[[field]]
name = "category_name"
label = "Category Name"
selector = "a[aria-current=page][data-track-component=breadcrumb_link]"

[[field]]
name = "course_name"
label = "Course Name"
selector = "h1.banner-title"

[[field]]
name = "first_instructor"
label = "First Instructor Name"
selector = ".instructor-count-display>span"
default = ""

[[field]]
name = "number_of_students"
label = "# of Students Enrolled"
selector = ".rc-ProductMetrics strong>span"
postprocessors = [{{ kind = "replace", from = ",", to = "" }}]

[[field]]
name = "number_of_ratings"
label = "# of Ratings"
selector = "[data-test=ratings-count-without-asterisks]>span"
postprocessors = [
    {{ kind = "replace", from = ",", to = "" }},
    {{ kind = "replace", from = "ratings", to = "" }},
    {{ kind = "strip" }},
]
"##
    );

    parse_config(&content).expect("Failed to parse test config")
}

fn course_page(name: &str, instructor: Option<&str>, students: &str, ratings: &str) -> String {
    let instructor = instructor
        .map(|i| format!(r#"<div class="instructor-count-display"><span>{}</span></div>"#, i))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <a aria-current="page" data-track-component="breadcrumb_link" href="/browse/data-science">Data Science</a>
        <h1 class="banner-title">{name}</h1>
        {instructor}
        <div class="rc-ProductMetrics"><strong><span>{students}</span></strong></div>
        <div data-test="ratings-count-without-asterisks"><span>{ratings}</span></div>
        </body></html>"#
    )
}

/// Mounts a listing page with three course links and their detail pages
async fn mount_catalog(mock_server: &MockServer, slow_course: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/browse/data-science"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <a class="CardText-link" href="/learn/alpha">Alpha</a>
            <a class="CardText-link" href="/learn/beta">Beta</a>
            <a class="CardText-link" href="/learn/gamma">Gamma</a>
            </body></html>"#,
        ))
        .mount(mock_server)
        .await;

    let pages = [
        ("alpha", course_page("Alpha", Some("Ada"), "12,345", "1,024 ratings")),
        ("beta", course_page("Beta", None, "99", "7 ratings")),
        ("gamma", course_page("Gamma", Some("Grace"), "1,000,000", "55,000 ratings")),
    ];

    for (slug, body) in pages {
        let mut template = ResponseTemplate::new(200).set_body_string(body);
        if slow_course == Some(slug) {
            template = template.set_delay(Duration::from_secs(5));
        }
        Mock::given(method("GET"))
            .and(path(format!("/learn/{}", slug)))
            .respond_with(template)
            .mount(mock_server)
            .await;
    }
}

#[tokio::test]
async fn test_full_crawl_single_category() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, None).await;

    let config = create_test_config(&mock_server.uri(), "");
    let catalog = Catalog::from_config(&config).unwrap();
    let category = catalog.get("data-science").expect("category missing");

    let result = crawl_category(&config, category).await.expect("Crawl failed");

    assert_eq!(result.records.len(), 3);
    assert!(result.failures.is_empty());

    let names: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.get("course_name").unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);

    assert_eq!(
        result.records[0].url(),
        format!("{}/learn/alpha", mock_server.uri())
    );

    let csv = encode_csv(
        &config.header_labels(),
        &result.records,
        &config.field_order(),
    );
    assert_eq!(
        csv,
        "Category Name,Course Name,First Instructor Name,# of Students Enrolled,# of Ratings\n\
         \"Data Science\",\"Alpha\",\"Ada\",\"12345\",\"1024\"\n\
         \"Data Science\",\"Beta\",\"\",\"99\",\"7\"\n\
         \"Data Science\",\"Gamma\",\"Grace\",\"1000000\",\"55000\"\n"
    );
}

#[tokio::test]
async fn test_listing_failure_aborts_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse/data-science"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    // No detail page may be requested
    Mock::given(method("GET"))
        .and(path("/learn/alpha"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "");
    let catalog = Catalog::from_config(&config).unwrap();

    let result = crawl_category(&config, catalog.get("data-science").unwrap()).await;
    assert!(matches!(result, Err(HarvestError::DiscoveryFailed { .. })));
}

#[tokio::test]
async fn test_slow_course_page_is_isolated() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, Some("beta")).await;

    let config = create_test_config(&mock_server.uri(), "");
    let orchestrator = Orchestrator::from_config(&config).unwrap();
    let catalog = Catalog::from_config(&config).unwrap();
    let request = catalog.get("data-science").unwrap().crawl_request(&config);

    let result = orchestrator.crawl(&request).await.expect("Crawl failed");

    let names: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.get("course_name").unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Gamma"]);

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].kind, FailureKind::FetchFailed);
    assert!(result.failures[0].url.ends_with("/learn/beta"));
}

#[tokio::test]
async fn test_listing_without_links_yields_header_only_csv() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse/data-science"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>No courses</body></html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "");
    let catalog = Catalog::from_config(&config).unwrap();
    let result = crawl_category(&config, catalog.get("data-science").unwrap())
        .await
        .unwrap();

    let csv = encode_csv(&config.header_labels(), &result.records, &config.field_order());
    assert_eq!(csv.lines().count(), 1);
}

#[tokio::test]
async fn test_download_route_returns_csv_attachment() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, None).await;

    let export_dir = tempfile::tempdir().unwrap();
    let extra = format!(
        "[output]\nexport-dir = \"{}\"",
        export_dir.path().display()
    );
    let config = create_test_config(&mock_server.uri(), &extra);
    let app = routes(AppState::from_config(config).unwrap());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories/data-science/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"data-science-"));
    assert!(disposition.ends_with(".csv\""));
    assert_eq!(
        response.headers().get("x-crawl-failures").unwrap(),
        "0"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with("Category Name,Course Name,"));

    // A copy lands in the export directory
    let exported: Vec<_> = std::fs::read_dir(export_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(exported.len(), 1);
    assert_eq!(std::fs::read_to_string(&exported[0]).unwrap(), csv);
}

#[tokio::test]
async fn test_unknown_category_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), "");
    let app = routes(AppState::from_config(config).unwrap());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories/underwater-basket-weaving/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Page not Found");
}

#[tokio::test]
async fn test_listing_failure_maps_to_bad_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse/data-science"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "");
    let app = routes(AppState::from_config(config).unwrap());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories/data-science/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_category_index_lists_categories() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), "");
    let app = routes(AppState::from_config(config).unwrap());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "id": "data-science", "name": "Data Science" }])
    );
}
