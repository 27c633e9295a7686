// tests/metrics.rs
// Installs the global Prometheus recorder, so this binary holds a single test.
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use news_summarizer::AppConfig;

#[tokio::test]
async fn metrics_endpoint_counts_requests_and_errors() {
    let mut cfg = AppConfig::with_api_key("test-key");
    cfg.metrics_enabled = true;
    let app = news_summarizer::app(cfg).expect("app() should build Router in tests");

    // One success and one validation error.
    for text in ["The report was released on Tuesday.", "   "] {
        let r = app
            .clone()
            .oneshot(
                Request::post("/summarize_text")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::json!({ "text": text }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(r.status() == StatusCode::OK || r.status() == StatusCode::BAD_REQUEST);
    }

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let body = body::to_bytes(m.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(
        text.contains(r#"http_requests_total{route="/summarize_text"} 2"#),
        "metrics exposition missing request counter\n{text}"
    );
    assert!(
        text.contains("http_errors_total") && text.contains(r#"kind="validation""#),
        "metrics exposition missing error counter\n{text}"
    );
}
