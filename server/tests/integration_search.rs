use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sitesearch_core::{build_index, Document, IndexHandle};
use sitesearch_crawler::{CrawlConfig, Crawler};
use sitesearch_server::pipeline::Pipeline;
use sitesearch_server::{build_app, AppState};
use tower::ServiceExt;
use wiremock::matchers::path;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn doc(url: &str, title: &str, body: &str) -> Document {
    Document { url: url.into(), title: title.into(), body: body.into(), links: vec![] }
}

fn tiny_index() -> IndexHandle {
    IndexHandle::new(
        build_index(vec![
            doc("https://example.com/a", "Platypus Facts", "The platypus lays eggs."),
            doc("https://example.com/b", "Unicorn", "Unicorns are mythical. A platypus is not."),
        ])
        .unwrap(),
    )
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn api_search_returns_ranked_results() {
    let app = build_app(AppState::new(tiny_index()));

    let (status, body) = get(app, "/api/search?q=platypus&k=5").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(json["total_hits"], 2);
    assert_eq!(arr.len(), 2);
    // Title match beats the body-only mention.
    assert_eq!(arr[0]["url"], "https://example.com/a");
    assert_eq!(arr[1]["url"], "https://example.com/b");
}

#[tokio::test]
async fn api_search_respects_k() {
    let app = build_app(AppState::new(tiny_index()));
    let (_, body) = get(app, "/api/search?q=platypus&k=1").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn api_search_miss_returns_sentinel() {
    let app = build_app(AppState::new(tiny_index()));
    let (_, body) = get(app, "/api/search?q=dragon").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["total_hits"], 0);
    assert_eq!(json["results"][0]["url"], "#");
    assert_eq!(json["results"][0]["title"], "No Results Found");
}

#[tokio::test]
async fn html_search_renders_results() {
    let app = build_app(AppState::new(tiny_index()));
    let (status, body) = get(app, "/search?q=unicorn").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="https://example.com/b">Unicorn</a>"#));
    assert!(!body.contains("https://example.com/a"));
}

#[tokio::test]
async fn empty_html_query_renders_home() {
    let app = build_app(AppState::new(tiny_index()));
    let (status, body) = get(app, "/search?q=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("2 pages indexed"));
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get(build_app(AppState::new(tiny_index())), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

fn reindex(token: Option<&str>) -> Request<Body> {
    let mut req = Request::post("/admin/reindex");
    if let Some(t) = token {
        req = req.header("X-ADMIN-TOKEN", t);
    }
    req.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn reindex_requires_token() {
    let state = AppState::new(tiny_index()).with_admin_token(Some("secret".into()));
    let (status, _) = call(build_app(state.clone()), reindex(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(build_app(state), reindex(Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reindex_swaps_in_fresh_crawl() {
    let site = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Dragons</title></head><body>Dragons breathe fire. <a href="/eggs">eggs</a></body></html>"#,
            "text/html",
        ))
        .mount(&site)
        .await;
    Mock::given(path("/eggs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Eggs</title></head><body>Dragon eggs are warm.</body></html>",
            "text/html",
        ))
        .mount(&site)
        .await;

    let index_dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(Crawler::new(CrawlConfig::default()).unwrap(), format!("{}/", site.uri()))
        .with_index_dir(index_dir.path());
    let handle = tiny_index();
    let state = AppState::new(handle.clone()).with_pipeline(pipeline).with_admin_token(Some("secret".into()));

    let (status, body) = call(build_app(state.clone()), reindex(Some("secret"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["num_docs"], 2);
    assert!(index_dir.path().join("index.bin").exists());

    let (_, body) = get(build_app(state), "/api/search?q=dragon").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["results"][0]["url"], format!("{}/", site.uri()));
    assert!(handle.search("platypus", 10)[0].is_sentinel());
}
