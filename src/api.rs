use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::article::{ArticleFetcher, HtmlArticleFetcher};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metrics::{record_error, record_request};
use crate::news::{ArticleSummary, NewsApiClient, NewsSource};
use crate::sentiment::{round3, SentimentAnalyzer, SentimentLabel};
use crate::spelling::SpellChecker;
use crate::summarize::{Summarizer, SummaryTarget};
use crate::translate::{language_code, GoogleTranslator, Translator};

/// Shared, read-only per-process state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    news: Arc<dyn NewsSource>,
    articles: Arc<dyn ArticleFetcher>,
    translator: Arc<dyn Translator>,
    summarizer: Arc<Summarizer>,
    sentiment: Arc<SentimentAnalyzer>,
    speller: Arc<SpellChecker>,
}

impl AppState {
    /// Wire the production collaborators around one shared HTTP client.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("building http client")?;

        Ok(Self {
            news: Arc::new(NewsApiClient::new(http.clone(), &config)),
            articles: Arc::new(HtmlArticleFetcher::new(http.clone())),
            translator: Arc::new(GoogleTranslator::new(http, &config)),
            summarizer: Arc::new(Summarizer::new()),
            sentiment: Arc::new(SentimentAnalyzer::new()),
            speller: Arc::new(SpellChecker::new()),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn with_news_source(mut self, news: Arc<dyn NewsSource>) -> Self {
        self.news = news;
        self
    }

    pub fn with_article_fetcher(mut self, articles: Arc<dyn ArticleFetcher>) -> Self {
        self.articles = articles;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/search", get(search_page))
        .route("/summary", get(summary_page))
        .route("/url", get(url_page))
        .route("/health", get(|| async { "OK" }))
        .route("/search_news", post(search_news))
        .route("/default_news", get(default_news))
        .route("/summarize_text", post(summarize_text))
        .route("/summarize_url", post(summarize_url))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ------------------------------------------------------------
// Pages
// ------------------------------------------------------------

async fn index_page() -> Html<&'static str> {
    Html(include_str!("../templates/index.html"))
}

async fn search_page() -> Html<&'static str> {
    Html(include_str!("../templates/search.html"))
}

async fn summary_page() -> Html<&'static str> {
    Html(include_str!("../templates/summary.html"))
}

async fn url_page() -> Html<&'static str> {
    Html(include_str!("../templates/url.html"))
}

// ------------------------------------------------------------
// DTOs
// ------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchNewsRequest {
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeTextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TextAnalysisResult {
    pub summary: String,
    pub sentiment: SentimentLabel,
    pub polarity: f64,
    pub subjectivity: f64,
}

#[derive(Debug, Serialize)]
pub struct UrlAnalysisResult {
    pub title: String,
    pub authors: Vec<String>,
    pub top_image: Option<String>,
    pub summary: String,
    pub sentiment: SentimentLabel,
    pub polarity: f64,
    pub subjectivity: f64,
}

// ------------------------------------------------------------
// Handlers
// ------------------------------------------------------------

#[tracing::instrument(skip_all)]
async fn search_news(
    State(state): State<AppState>,
    payload: Result<Json<SearchNewsRequest>, JsonRejection>,
) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    const ROUTE: &str = "/search_news";
    record_request(ROUTE);

    let res: Result<_, ApiError> = async move {
        let Json(body) = payload.map_err(bad_json)?;
        let keyword = non_blank(body.keyword).ok_or_else(|| ApiError::validation("Keyword is required"))?;

        let corrected = state.speller.correct(keyword.trim());
        if corrected != keyword.trim() {
            debug!(%corrected, "keyword spelling corrected");
        }

        let articles = state.news.search(&corrected).await?;
        info!(source = state.news.name(), count = articles.len(), "search_news ok");
        Ok(Json(articles))
    }
    .await;

    finish(ROUTE, res)
}

#[tracing::instrument(skip_all)]
async fn default_news(State(state): State<AppState>) -> Result<Json<Vec<ArticleSummary>>, ApiError> {
    const ROUTE: &str = "/default_news";
    record_request(ROUTE);

    let res: Result<_, ApiError> = async move {
        let articles = state.news.top_headlines().await?;
        info!(source = state.news.name(), count = articles.len(), "default_news ok");
        Ok(Json(articles))
    }
    .await;

    finish(ROUTE, res)
}

#[tracing::instrument(skip_all)]
async fn summarize_text(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeTextRequest>, JsonRejection>,
) -> Result<Json<TextAnalysisResult>, ApiError> {
    const ROUTE: &str = "/summarize_text";
    record_request(ROUTE);

    let res: Result<_, ApiError> = async move {
        let Json(body) = payload.map_err(bad_json)?;
        let text = non_blank(body.text).ok_or_else(|| ApiError::validation("Text is empty."))?;

        let mut summary = state
            .summarizer
            .summarize(&text, SummaryTarget::Ratio(state.config.summary_ratio));
        if summary.is_empty() {
            summary = text;
        }

        let s = state.sentiment.analyze(&summary);
        info!(summary_chars = summary.len(), polarity = s.polarity, "summarize_text ok");
        Ok(Json(TextAnalysisResult {
            sentiment: s.label(),
            polarity: round3(s.polarity),
            subjectivity: round3(s.subjectivity),
            summary,
        }))
    }
    .await;

    finish(ROUTE, res)
}

#[tracing::instrument(skip_all)]
async fn summarize_url(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeUrlRequest>, JsonRejection>,
) -> Result<Json<UrlAnalysisResult>, ApiError> {
    const ROUTE: &str = "/summarize_url";
    record_request(ROUTE);

    let res: Result<_, ApiError> = async move {
        let Json(body) = payload.map_err(bad_json)?;
        let url = non_blank(body.url).ok_or_else(|| ApiError::validation("URL is required"))?;
        let language = normalize_language(body.language.as_deref())?;

        let article = state.articles.fetch(url.trim()).await?;

        let mut summary = state
            .summarizer
            .summarize(&article.text, SummaryTarget::Words(state.config.summary_words));
        if summary.is_empty() {
            summary = article.text.clone();
        }

        // Scored on the English summary, before any translation.
        let s = state.sentiment.analyze(&summary);

        let (title, summary) = if is_english(&language) {
            (article.title, summary)
        } else {
            debug!(%language, provider = state.translator.provider_name(), "translating");
            let translated_summary = state.translator.translate(&summary, &language).await?;
            let translated_title = state.translator.translate(&article.title, &language).await?;
            (translated_title, translated_summary)
        };

        info!(%language, authors = article.authors.len(), polarity = s.polarity, "summarize_url ok");
        Ok(Json(UrlAnalysisResult {
            title,
            authors: article.authors,
            top_image: article.top_image,
            summary,
            sentiment: s.label(),
            polarity: round3(s.polarity),
            subjectivity: round3(s.subjectivity),
        }))
    }
    .await;

    finish(ROUTE, res)
}

// ------------------------------------------------------------
// Helpers
// ------------------------------------------------------------

fn finish<T>(route: &'static str, res: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &res {
        record_error(route, e.kind());
        match e {
            ApiError::Validation(msg) => debug!(route, error = %msg, "rejected request"),
            ApiError::Downstream(msg) => warn!(route, error = %msg, "downstream failure"),
        }
    }
    res
}

fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(rejection.body_text())
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Trimmed, lower-cased language code; blank or absent means English.
/// Language names ("spanish") are mapped to their code.
fn normalize_language(raw: Option<&str>) -> Result<String, ApiError> {
    let code = raw.unwrap_or_default().trim().to_ascii_lowercase();
    if code.is_empty() {
        return Ok("en".to_string());
    }
    if let Some(mapped) = language_code(&code) {
        return Ok(mapped.to_string());
    }
    if !LANG_CODE.is_match(&code) {
        return Err(ApiError::validation("Unsupported language code"));
    }
    Ok(code)
}

/// `es`, `haw`, `zh-cn`, `sr-latn`.
static LANG_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2,3}(-[a-z]{2,4})?$").unwrap());

fn is_english(code: &str) -> bool {
    code == "en" || code.starts_with("en-")
}
