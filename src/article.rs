// src/article.rs
//! Article download + extraction.
//!
//! `download` fetches the page (2xx, HTML only); `parse` pulls title,
//! authors, top image and body text out of the markup. Either step failing
//! fails the whole fetch.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Paragraphs shorter than this are navigation, captions, bylines...
const MIN_PARAGRAPH_WORDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Article {
    pub title: String,
    pub authors: Vec<String>,
    pub top_image: Option<String>,
    pub text: String,
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Article>;
}

pub struct HtmlArticleFetcher {
    http: reqwest::Client,
}

impl HtmlArticleFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn download(&self, url: &Url) -> Result<String> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("downloading {url}"))?
            .error_for_status()
            .with_context(|| format!("downloading {url}"))?;

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.is_empty() && !content_type.contains("html") {
            bail!("unsupported content type '{content_type}' at {url}");
        }

        resp.text().await.context("reading article body")
    }
}

#[async_trait]
impl ArticleFetcher for HtmlArticleFetcher {
    #[tracing::instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<Article> {
        let t0 = std::time::Instant::now();
        let parsed = Url::parse(url.trim()).with_context(|| format!("invalid article url '{url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("unsupported url scheme '{}'", parsed.scheme());
        }

        let html = self.download(&parsed).await?;
        histogram!("downstream_ms", "service" => "article").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let article = parse(&html, &parsed)?;
        debug!(
            chars = article.text.len(),
            authors = article.authors.len(),
            has_image = article.top_image.is_some(),
            "article parsed"
        );
        Ok(article)
    }
}

fn sel(s: &str) -> Selector {
    Selector::parse(s).unwrap()
}

static OG_TITLE: Lazy<Selector> = Lazy::new(|| sel(r#"meta[property="og:title"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| sel("title"));
static H1: Lazy<Selector> = Lazy::new(|| sel("h1"));
static AUTHOR_META: Lazy<Selector> =
    Lazy::new(|| sel(r#"meta[name="author"], meta[property="article:author"]"#));
static AUTHOR_NODES: Lazy<Selector> = Lazy::new(|| sel(r#"[rel="author"], [itemprop="author"]"#));
static IMAGE_META: Lazy<Selector> =
    Lazy::new(|| sel(r#"meta[property="og:image"], meta[name="twitter:image"]"#));
static ARTICLE: Lazy<Selector> = Lazy::new(|| sel("article"));
static IMG: Lazy<Selector> = Lazy::new(|| sel("img[src]"));
static P: Lazy<Selector> = Lazy::new(|| sel("p"));

/// Extract an `Article` from raw HTML. `base` resolves relative image links.
pub fn parse(html: &str, base: &Url) -> Result<Article> {
    let doc = Html::parse_document(html);
    let body = doc.select(&ARTICLE).next();

    let title = meta_content(&doc, &OG_TITLE)
        .or_else(|| first_text(&doc, &TITLE))
        .or_else(|| first_text(&doc, &H1))
        .unwrap_or_default();

    let text = extract_text(&doc, body);
    if text.is_empty() {
        return Err(anyhow!("no article text found at {base}"));
    }

    Ok(Article {
        title,
        authors: extract_authors(&doc),
        top_image: extract_top_image(&doc, body, base),
        text,
    })
}

fn meta_content(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .filter_map(|m| m.value().attr("content"))
        .map(normalize_text)
        .find(|s| !s.is_empty())
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|e| normalize_text(&e.text().collect::<String>()))
        .find(|s| !s.is_empty())
}

fn extract_text(doc: &Html, body: Option<ElementRef<'_>>) -> String {
    let paragraphs: Vec<String> = match body {
        Some(article) => article.select(&P).map(element_text).collect(),
        None => doc.select(&P).map(element_text).collect(),
    };
    paragraphs
        .into_iter()
        .filter(|p| p.split_whitespace().count() >= MIN_PARAGRAPH_WORDS)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn element_text(e: ElementRef<'_>) -> String {
    normalize_text(&e.text().collect::<Vec<_>>().join(" "))
}

/// Meta tags first, then byline nodes. Names are split on "," / " and ",
/// de-duplicated case-insensitively keeping the first spelling.
fn extract_authors(doc: &Html) -> Vec<String> {
    static SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i),|\s+and\s+").unwrap());
    static BY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^by\s+").unwrap());

    let raw = doc
        .select(&AUTHOR_META)
        .filter_map(|m| m.value().attr("content").map(str::to_string))
        .chain(
            doc.select(&AUTHOR_NODES)
                .map(|e| e.text().collect::<Vec<_>>().join(" ")),
        );

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for chunk in raw {
        for name in SPLIT.split(&chunk) {
            let name = normalize_text(name);
            let name = BY.replace(&name, "").trim().to_string();
            // URLs in article:author and empty leftovers are not names
            if name.is_empty() || name.contains("://") {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                out.push(name);
            }
        }
    }
    out
}

fn extract_top_image(doc: &Html, body: Option<ElementRef<'_>>, base: &Url) -> Option<String> {
    let candidate = doc
        .select(&IMAGE_META)
        .filter_map(|m| m.value().attr("content"))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            body.and_then(|b| b.select(&IMG).next())
                .and_then(|img| img.value().attr("src"))
                .map(|s| s.trim().to_string())
        })?;
    base.join(&candidate).ok().map(|u| u.to_string())
}

/// Decode entities, strip leftover tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s);
    let stripped = RE_TAGS.replace_all(&decoded, "");
    RE_WS.replace_all(&stripped, " ").trim().to_string()
}
