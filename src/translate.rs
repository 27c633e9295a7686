// src/translate.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde_json::Value;

use crate::config::AppConfig;

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target` (ISO code such as "de", "zh-cn").
    async fn translate(&self, text: &str, target: &str) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

/// Public Google translate endpoint (`client=gtx`), source language auto-detected.
pub struct GoogleTranslator {
    http: reqwest::Client,
    base: String,
}

impl GoogleTranslator {
    pub fn new(http: reqwest::Client, cfg: &AppConfig) -> Self {
        Self {
            http,
            base: cfg.translate_base.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[tracing::instrument(level = "debug", skip_all, fields(lang = %target, chars = text.len()))]
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let t0 = std::time::Instant::now();

        let body: Value = self
            .http
            .get(&self.base)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("translate request")?
            .error_for_status()
            .context("translate non-2xx")?
            .json()
            .await
            .context("translate response is not json")?;

        histogram!("downstream_ms", "service" => "translate").record(t0.elapsed().as_secs_f64() * 1_000.0);
        parse_translation(&body)
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}

/// English language names accepted in place of a code, as googletrans does.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("afrikaans", "af"),
    ("albanian", "sq"),
    ("arabic", "ar"),
    ("armenian", "hy"),
    ("bengali", "bn"),
    ("bulgarian", "bg"),
    ("catalan", "ca"),
    ("chinese", "zh-cn"),
    ("chinese (simplified)", "zh-cn"),
    ("chinese (traditional)", "zh-tw"),
    ("croatian", "hr"),
    ("czech", "cs"),
    ("danish", "da"),
    ("dutch", "nl"),
    ("english", "en"),
    ("estonian", "et"),
    ("filipino", "tl"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("german", "de"),
    ("greek", "el"),
    ("gujarati", "gu"),
    ("hebrew", "iw"),
    ("hindi", "hi"),
    ("hungarian", "hu"),
    ("icelandic", "is"),
    ("indonesian", "id"),
    ("irish", "ga"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("kannada", "kn"),
    ("korean", "ko"),
    ("latvian", "lv"),
    ("lithuanian", "lt"),
    ("malay", "ms"),
    ("malayalam", "ml"),
    ("marathi", "mr"),
    ("norwegian", "no"),
    ("persian", "fa"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("punjabi", "pa"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("serbian", "sr"),
    ("slovak", "sk"),
    ("slovenian", "sl"),
    ("spanish", "es"),
    ("swahili", "sw"),
    ("swedish", "sv"),
    ("tamil", "ta"),
    ("telugu", "te"),
    ("thai", "th"),
    ("turkish", "tr"),
    ("ukrainian", "uk"),
    ("urdu", "ur"),
    ("vietnamese", "vi"),
    ("welsh", "cy"),
];

/// Code for a lower-case English language name, if known.
pub fn language_code(name: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Response shape: `[[["<translated>", "<source>", ...], ...], ...]`; the
/// translation is the concatenation of every segment's first element.
fn parse_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("unexpected translate response shape"))?;

    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    if out.is_empty() {
        return Err(anyhow!("translate response contained no text"));
    }
    Ok(out)
}
