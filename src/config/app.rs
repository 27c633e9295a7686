// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_CONFIG_PATH: &str = "NEWS_SUMMARIZER_CONFIG";
pub const ENV_COUNTRY: &str = "NEWS_COUNTRY";
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

fn default_news_api_base() -> String {
    "https://newsapi.org/v2".to_string()
}
fn default_country() -> String {
    "us".to_string()
}
fn default_search_language() -> String {
    "en".to_string()
}
fn default_search_page_size() -> u32 {
    10
}
fn default_summary_ratio() -> f64 {
    0.3
}
fn default_summary_words() -> usize {
    100
}
fn default_translate_base() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; news-summarizer/0.1)".to_string()
}

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Never read from the TOML file; always taken from `NEWS_API_KEY`.
    #[serde(skip)]
    pub news_api_key: String,
    #[serde(default = "default_news_api_base")]
    pub news_api_base: String,
    /// Two-letter country code used by `/default_news`.
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_search_language")]
    pub search_language: String,
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u32,
    /// Fraction of sentences kept by `/summarize_text`.
    #[serde(default = "default_summary_ratio")]
    pub summary_ratio: f64,
    /// Target summary length for `/summarize_url`.
    #[serde(default = "default_summary_words")]
    pub summary_words: usize,
    #[serde(default = "default_translate_base")]
    pub translate_base: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub metrics_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            news_api_key: String::new(),
            news_api_base: default_news_api_base(),
            country: default_country(),
            search_language: default_search_language(),
            search_page_size: default_search_page_size(),
            summary_ratio: default_summary_ratio(),
            summary_words: default_summary_words(),
            translate_base: default_translate_base(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            metrics_enabled: false,
        }
    }
}

impl AppConfig {
    /// Load settings using env var + fallbacks:
    /// 1) $NEWS_SUMMARIZER_CONFIG (must exist if set)
    /// 2) config/app.toml
    /// 3) built-in defaults
    ///
    /// `NEWS_API_KEY` is required in every case.
    pub fn from_env() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };

        cfg.news_api_key = env::var(ENV_API_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("Missing {ENV_API_KEY} env var"))?;

        if let Ok(country) = env::var(ENV_COUNTRY) {
            cfg.country = country;
        }
        if env::var(ENV_METRICS_ENABLED).is_ok_and(|v| v == "1") {
            cfg.metrics_enabled = true;
        }

        Ok(cfg.sanitized())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s).context("parsing app config toml")?;
        Ok(cfg.sanitized())
    }

    /// Convenience for tests/tools: defaults plus an explicit key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            news_api_key: key.into(),
            ..Self::default()
        }
    }

    fn sanitized(mut self) -> Self {
        self.country = self.country.trim().to_ascii_lowercase();
        if self.country.is_empty() {
            self.country = default_country();
        }
        self.search_language = self.search_language.trim().to_ascii_lowercase();
        if self.search_language.is_empty() {
            self.search_language = default_search_language();
        }
        if !(1..=100).contains(&self.search_page_size) {
            self.search_page_size = default_search_page_size();
        }
        if !(self.summary_ratio > 0.0 && self.summary_ratio <= 1.0) {
            self.summary_ratio = default_summary_ratio();
        }
        if self.summary_words == 0 {
            self.summary_words = default_summary_words();
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = default_connect_timeout_secs();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        self.news_api_base = self.news_api_base.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_and_defaults_mix() {
        let cfg = AppConfig::from_toml_str(
            r#"
            country = " GB "
            summary_words = 60
            news_api_base = "http://localhost:9999/v2/"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.country, "gb");
        assert_eq!(cfg.summary_words, 60);
        assert_eq!(cfg.news_api_base, "http://localhost:9999/v2");
        assert_eq!(cfg.search_page_size, 10);
        assert!((cfg.summary_ratio - 0.3).abs() < f64::EPSILON);
        assert!(cfg.news_api_key.is_empty());
    }

    #[test]
    fn out_of_range_values_fall_back() {
        let cfg = AppConfig::from_toml_str(
            r#"
            search_page_size = 0
            summary_ratio = 1.5
            summary_words = 0
            request_timeout_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.search_page_size, 10);
        assert!((cfg.summary_ratio - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.summary_words, 100);
        assert_eq!(cfg.request_timeout_secs, 15);
    }

    #[serial_test::serial]
    #[test]
    fn from_env_requires_api_key() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_COUNTRY);
        env::set_var(ENV_API_KEY, "   ");
        assert!(AppConfig::from_env().is_err());

        env::set_var(ENV_API_KEY, "secret");
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.news_api_key, "secret");
        assert_eq!(cfg.country, "us");

        // Explicit path wins over the default location.
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "country = \"de\"").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.country, "de");

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_API_KEY);
        env::set_current_dir(&old).unwrap();
    }
}
