//! End-to-end API tests: a real listener on an ephemeral port, driven over
//! HTTP with reqwest, asserting on both the wire responses and the files
//! left (or not left) on disk.

use std::path::Path;

use adlift_feed::parse::parse_feed;
use adlift_feed::{validate, FeedWriter};
use adlift_service::{router, SubmissionService};
use serde_json::{json, Value};
use tempfile::TempDir;

struct TestApp {
    base_url: String,
    out_dir: std::path::PathBuf,
    _tmp: TempDir,
}

async fn spawn_app() -> TestApp {
    let tmp = TempDir::new().expect("temp dir");
    let out_dir = tmp.path().join("out_xml");
    let service = SubmissionService::new(FeedWriter::new(&out_dir));
    let app = router(service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        out_dir,
        _tmp: tmp,
    }
}

fn feed_files(dir: &Path) -> Vec<std::path::PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .expect("read out dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn health_reports_healthy_with_server_time() {
    let app = spawn_app().await;
    let resp = reqwest::get(format!("{}/api/v1/health", app.base_url))
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "healthy");
    let stamp = body["timestamp"].as_str().expect("timestamp string");
    chrono::DateTime::parse_from_rfc3339(stamp).expect("ISO-8601 timestamp");
}

#[tokio::test]
async fn create_ad_persists_a_schema_valid_single_entry_feed() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/create_ad", app.base_url))
        .json(&json!({
            "title": "Test iPhone",
            "description": "Test Description",
            "price": 100000,
            "category": "Electronics",
            "images": ["https://x/1.jpg"],
            "params": {"Condition": "New"}
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Ad created successfully");

    let file = body["file"].as_str().expect("file path");
    let xml = std::fs::read_to_string(file).expect("written feed");
    let doc = parse_feed(&xml).expect("parse feed");

    assert_eq!(doc.root_tag(), "Ads");
    assert_eq!(doc.format_version(), "3");
    assert_eq!(doc.target(), "Avito.ru");
    assert_eq!(doc.entries().len(), 1);

    let entry = &doc.entries()[0];
    assert_eq!(entry.title(), "Test iPhone");
    assert_eq!(entry.description(), "Test Description");
    assert_eq!(entry.price(), "100000");
    assert_eq!(entry.images()[0].url(), "https://x/1.jpg");
    assert_eq!(
        entry.extra_fields(),
        &[("Condition".to_string(), "New".to_string())]
    );
}

#[tokio::test]
async fn create_ad_names_the_first_missing_field_and_writes_nothing() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/create_ad", app.base_url))
        .json(&json!({"title": "T", "price": 1, "category": "C"}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Missing required field: description");
    assert!(feed_files(&app.out_dir).is_empty());
}

#[tokio::test]
async fn construction_defect_is_a_server_error_and_writes_nothing() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // An empty title passes the presence checks but fails the structural
    // validation pass before persistence, which is a server fault, not a
    // malformed request.
    let resp = client
        .post(format!("{}/api/v1/create_ad", app.base_url))
        .json(&json!({"title": "", "description": "D", "price": 1, "category": "C"}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 500);

    let body: Value = resp.json().await.expect("json body");
    let error = body["error"].as_str().expect("error string");
    assert!(error.starts_with("Validation failed"), "got: {error}");
    assert!(feed_files(&app.out_dir).is_empty());
}

#[tokio::test]
async fn bulk_creates_all_ads_in_submission_order() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/create_bulk_ads", app.base_url))
        .json(&json!({
            "category": "Electronics",
            "ads": [
                {"title": "iPhone 1", "description": "Description 1", "price": 100000,
                 "images": ["https://x/1.jpg"], "params": {"Condition": "New"}},
                {"title": "iPhone 2", "description": "Description 2", "price": 200000,
                 "images": ["https://x/2.jpg"], "params": {"Condition": "Used"}}
            ]
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["message"], "Created 2 ads successfully");

    let xml = std::fs::read_to_string(body["file"].as_str().unwrap()).expect("written feed");
    let doc = parse_feed(&xml).expect("parse feed");
    let titles: Vec<_> = doc.entries().iter().map(|e| e.title()).collect();
    assert_eq!(titles, vec!["iPhone 1", "iPhone 2"]);
    assert!(validate(&doc).is_empty());
}

#[tokio::test]
async fn bulk_missing_top_level_fields_is_a_joint_client_error() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/create_bulk_ads", app.base_url))
        .json(&json!({}))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Missing required fields: category, ads");
    assert!(feed_files(&app.out_dir).is_empty());
}

#[tokio::test]
async fn bulk_with_one_malformed_ad_fails_atomically() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/create_bulk_ads", app.base_url))
        .json(&json!({
            "category": "Electronics",
            "ads": [
                {"title": "Good", "description": "D", "price": 1},
                {"title": "No price", "description": "D"}
            ]
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], "Missing required field in ad 1: price");
    assert!(feed_files(&app.out_dir).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_bulk_submissions_produce_distinct_complete_files() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let mut handles = Vec::new();
    for i in 0..50 {
        let client = client.clone();
        let url = format!("{}/api/v1/create_bulk_ads", app.base_url);
        handles.push(tokio::spawn(async move {
            let resp = client
                .post(&url)
                .json(&json!({
                    "category": "Electronics",
                    "ads": [
                        {"title": format!("Ad {i}a"), "description": "D", "price": i},
                        {"title": format!("Ad {i}b"), "description": "D", "price": i + 1}
                    ]
                }))
                .send()
                .await
                .expect("request");
            assert_eq!(resp.status(), 200);
            let body: Value = resp.json().await.expect("json body");
            body["file"].as_str().expect("file path").to_string()
        }));
    }

    let mut paths = Vec::new();
    for handle in handles {
        paths.push(handle.await.expect("task"));
    }

    let unique: std::collections::HashSet<_> = paths.iter().collect();
    assert_eq!(unique.len(), 50, "filename collision under concurrency");

    // Every file is complete and valid; none is partially written.
    for path in &paths {
        let xml = std::fs::read_to_string(path).expect("written feed");
        let doc = parse_feed(&xml).expect("parse feed");
        assert_eq!(doc.entries().len(), 2);
        assert!(validate(&doc).is_empty());
    }
    assert_eq!(feed_files(&app.out_dir).len(), 50);
}
