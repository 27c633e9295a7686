// src/news.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Flattened projection of a news item. Any field may be missing upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArticleSummary {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Keyword search over all articles.
    async fn search(&self, query: &str) -> Result<Vec<ArticleSummary>>;
    /// Current top headlines for the configured country.
    async fn top_headlines(&self) -> Result<Vec<ArticleSummary>>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

/// NewsAPI.org client (`/everything` + `/top-headlines`).
pub struct NewsApiClient {
    http: reqwest::Client,
    base: String,
    api_key: String,
    language: String,
    page_size: u32,
    country: String,
}

impl NewsApiClient {
    pub fn new(http: reqwest::Client, cfg: &AppConfig) -> Self {
        Self {
            http,
            base: cfg.news_api_base.clone(),
            api_key: cfg.news_api_key.clone(),
            language: cfg.search_language.clone(),
            page_size: cfg.search_page_size,
            country: cfg.country.clone(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[tracing::instrument(level = "debug", skip_all, fields(query_len = query.len()))]
    async fn search(&self, query: &str) -> Result<Vec<ArticleSummary>> {
        let t0 = std::time::Instant::now();
        let page_size = self.page_size.to_string();

        let resp = self
            .http
            .get(format!("{}/everything", self.base))
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query),
                ("language", self.language.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .context("newsapi everything request")?;

        let status = resp.status();
        let body: EverythingResponse = resp
            .json()
            .await
            .with_context(|| format!("newsapi everything response (http {status})"))?;

        histogram!("downstream_ms", "service" => "newsapi").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let out = map_everything(body)?;
        debug!(count = out.len(), "newsapi search done");
        Ok(out)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(country = %self.country))]
    async fn top_headlines(&self) -> Result<Vec<ArticleSummary>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .http
            .get(format!("{}/top-headlines", self.base))
            .query(&[
                ("country", self.country.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("newsapi top-headlines request")?;

        let body: Value = resp
            .json()
            .await
            .context("newsapi top-headlines response is not json")?;

        histogram!("downstream_ms", "service" => "newsapi").record(t0.elapsed().as_secs_f64() * 1_000.0);

        if let Some(upstream_message) = non_ok_message(&body) {
            warn!(%upstream_message, "newsapi top-headlines returned non-ok status");
        }
        Ok(map_headlines(&body))
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

fn map_everything(body: EverythingResponse) -> Result<Vec<ArticleSummary>> {
    if body.status != "ok" {
        return Err(anyhow!(
            "newsapi error ({}): {}",
            body.code.as_deref().unwrap_or("unknown"),
            body.message.as_deref().unwrap_or("no message")
        ));
    }
    Ok(body
        .articles
        .into_iter()
        .map(|a| ArticleSummary {
            title: a.title,
            description: a.description,
            url: a.url,
            image: a.url_to_image,
        })
        .collect())
}

/// `Some(message)` when NewsAPI reports anything other than `status: ok`.
fn non_ok_message(body: &Value) -> Option<&str> {
    if body.get("status").and_then(Value::as_str) == Some("ok") {
        return None;
    }
    Some(body.get("message").and_then(Value::as_str).unwrap_or_default())
}

/// Permissive mapping: a missing `articles` key gives an empty list, and any
/// missing or non-string field becomes `None`.
fn map_headlines(body: &Value) -> Vec<ArticleSummary> {
    let field = |item: &Value, key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);
    body.get("articles")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| ArticleSummary {
                    title: field(item, "title"),
                    description: field(item, "description"),
                    url: field(item, "url"),
                    image: field(item, "urlToImage"),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn everything_maps_url_to_image() {
        let body: EverythingResponse = serde_json::from_value(json!({
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": null, "name": "Wire"},
                "author": "A. Writer",
                "title": "Rates hold",
                "description": null,
                "url": "https://example.com/a",
                "urlToImage": "https://example.com/a.jpg",
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": "..."
            }]
        }))
        .unwrap();
        let out = map_everything(body).unwrap();
        assert_eq!(
            out,
            vec![ArticleSummary {
                title: Some("Rates hold".into()),
                description: None,
                url: Some("https://example.com/a".into()),
                image: Some("https://example.com/a.jpg".into()),
            }]
        );
    }

    #[test]
    fn everything_error_status_is_an_error() {
        let body: EverythingResponse = serde_json::from_value(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid."
        }))
        .unwrap();
        let err = map_everything(body).unwrap_err().to_string();
        assert!(err.contains("apiKeyInvalid"), "{err}");
        assert!(err.contains("Your API key is invalid."), "{err}");
    }

    #[test]
    fn headlines_tolerate_missing_and_odd_fields() {
        let body = json!({
            "status": "ok",
            "articles": [
                {"title": "One", "url": "https://x/1", "urlToImage": null},
                {"title": 42, "description": "Two"}
            ]
        });
        let out = map_headlines(&body);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title.as_deref(), Some("One"));
        assert_eq!(out[0].image, None);
        assert_eq!(out[1].title, None);
        assert_eq!(out[1].description.as_deref(), Some("Two"));
        assert_eq!(out[1].url, None);
    }

    #[test]
    fn non_ok_status_surfaces_upstream_message() {
        assert_eq!(non_ok_message(&json!({"status": "ok", "articles": []})), None);
        assert_eq!(
            non_ok_message(&json!({"status": "error", "message": "rate limited"})),
            Some("rate limited")
        );
        assert_eq!(non_ok_message(&json!({})), Some(""));
    }

    #[test]
    fn headlines_without_articles_key_is_empty() {
        let body = json!({"status": "error", "message": "rate limited"});
        assert!(map_headlines(&body).is_empty());
    }

    #[test]
    fn summary_serializes_exactly_four_nullable_keys() {
        let v = serde_json::to_value(ArticleSummary::default()).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for k in ["title", "description", "url", "image"] {
            assert!(obj[k].is_null(), "{k}");
        }
    }
}
