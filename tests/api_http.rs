// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health and the four HTML pages
// - POST /summarize_text (success, fallback, neutral boundary, validation)
// - Validation on /search_news before any network call
// - CORS headers

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use news_summarizer::{api, AppConfig, AppState};

const BODY_LIMIT: usize = 1024 * 1024;

/// Same router the binary uses, with production collaborators that are
/// never reached by these requests.
fn test_router() -> Router {
    let state = AppState::from_config(AppConfig::with_api_key("test-key")).expect("state");
    api::router(state)
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("json body");
    (status, v)
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "OK");
}

#[tokio::test]
async fn pages_render_html() {
    for (uri, needle) in [
        ("/", "Top headlines"),
        ("/search", "Search news"),
        ("/summary", "Summarize text"),
        ("/url", "Summarize an article"),
    ] {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let ct = resp
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(ct.starts_with("text/html"), "{uri}: {ct}");
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(needle), "{uri} missing '{needle}'");
    }
}

#[tokio::test]
async fn summarize_text_happy_example_is_positive() {
    let text = "The team won. Everyone was happy and excited about the victory.";
    let (status, v) = post_json(test_router(), "/summarize_text", json!({ "text": text })).await;
    assert_eq!(status, StatusCode::OK, "{v}");

    let summary = v["summary"].as_str().expect("summary");
    assert!(!summary.is_empty());
    // two unrelated sentences: summarizer yields nothing, fallback to input
    assert_eq!(summary, text);
    assert!(v["polarity"].as_f64().unwrap() > 0.0);
    assert_eq!(v["sentiment"], "😊 Positive");
}

#[tokio::test]
async fn summarize_text_fields_are_in_range_and_rounded() {
    let text = "The city council approved the new transit budget on Monday. \
        The transit budget adds bus routes across the city. \
        Council members argued about the terrible cost of the bus routes. \
        Residents packed the council meeting to speak about transit. \
        Several residents said the new bus routes would be a great help. \
        The mayor praised the council for passing the budget. \
        Construction of the routes begins next spring, the city said. \
        Transit officials expect ridership to grow once routes open. \
        The budget vote was seven to two. \
        Critics called the budget vote rushed.";
    let (status, v) = post_json(test_router(), "/summarize_text", json!({ "text": text })).await;
    assert_eq!(status, StatusCode::OK, "{v}");

    let obj = v.as_object().unwrap();
    for k in ["summary", "sentiment", "polarity", "subjectivity"] {
        assert!(obj.contains_key(k), "missing '{k}'");
    }
    let p = v["polarity"].as_f64().unwrap();
    let s = v["subjectivity"].as_f64().unwrap();
    assert!((-1.0..=1.0).contains(&p));
    assert!((0.0..=1.0).contains(&s));
    for x in [p, s] {
        assert!(((x * 1000.0).round() - x * 1000.0).abs() < 1e-6, "not rounded: {x}");
    }
    let summary = v["summary"].as_str().unwrap();
    assert!(summary.len() < text.len(), "expected a shorter summary");
}

#[tokio::test]
async fn summarize_text_zero_polarity_is_neutral() {
    let (status, v) = post_json(
        test_router(),
        "/summarize_text",
        json!({ "text": "The report was released on Tuesday." }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["polarity"].as_f64(), Some(0.0));
    assert_eq!(v["sentiment"], "😐 Neutral");
}

#[tokio::test]
async fn summarize_text_rejects_blank_and_missing_text() {
    for payload in [json!({ "text": "" }), json!({ "text": "  \n\t " }), json!({})] {
        let (status, v) = post_json(test_router(), "/summarize_text", payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(v["error"], "Text is empty.");
        assert_eq!(v["kind"], "validation");
    }
}

#[tokio::test]
async fn search_news_rejects_blank_keyword() {
    for payload in [json!({ "keyword": "" }), json!({ "keyword": "   " }), json!({})] {
        let (status, v) = post_json(test_router(), "/search_news", payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(v["error"], "Keyword is required");
    }
}

#[tokio::test]
async fn summarize_url_requires_url() {
    let (status, v) = post_json(test_router(), "/summarize_url", json!({ "language": "de" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["error"], "URL is required");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let req = Request::builder()
        .method("POST")
        .uri("/summarize_text")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["kind"], "validation");
    assert!(v["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let req = Request::get("/health")
        .header("origin", "https://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    let allowed = resp
        .headers()
        .get("access-control-allow-origin")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    assert!(
        allowed == "*" || allowed == "https://elsewhere.example",
        "unexpected allow-origin '{allowed}'"
    );
}
