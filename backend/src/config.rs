use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub upstream_url: String,
    pub port: u16,
    pub cookie_secure: bool,
    pub supported_locales: Vec<String>,
    pub default_locale: String,
    pub upstream_timeout_secs: u64,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let upstream_url = env::var("STUDIO_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        let upstream_url = normalize_upstream_url(&upstream_url)?;

        let port = env::var("STUDIO_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .context("STUDIO_PORT must be a port number")?;

        let cookie_secure = env::var("STUDIO_COOKIE_SECURE")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        let supported_locales = parse_locales(
            &env::var("STUDIO_SUPPORTED_LOCALES").unwrap_or_else(|_| "en,ko,ja".to_string()),
        );
        if supported_locales.is_empty() {
            return Err(anyhow!("STUDIO_SUPPORTED_LOCALES must list at least one locale"));
        }

        let default_locale = env::var("STUDIO_DEFAULT_LOCALE")
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_else(|_| supported_locales[0].clone());
        if !supported_locales.contains(&default_locale) {
            return Err(anyhow!(
                "STUDIO_DEFAULT_LOCALE {} is not one of the supported locales",
                default_locale
            ));
        }

        let upstream_timeout_secs = env::var("STUDIO_UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let cors_origin = env::var("STUDIO_CORS_ORIGIN")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Config {
            upstream_url,
            port,
            cookie_secure,
            supported_locales,
            default_locale,
            upstream_timeout_secs,
            cors_origin,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Defaults suitable for tests: everything local, cookies not marked secure.
    pub fn for_upstream(upstream_url: impl Into<String>) -> Self {
        Config {
            upstream_url: upstream_url.into(),
            port: 0,
            cookie_secure: false,
            supported_locales: vec!["en".into(), "ko".into(), "ja".into()],
            default_locale: "en".into(),
            upstream_timeout_secs: 5,
            cors_origin: None,
        }
    }
}

fn normalize_upstream_url(raw: &str) -> anyhow::Result<String> {
    let parsed =
        Url::parse(raw.trim()).with_context(|| format!("Invalid STUDIO_UPSTREAM_URL: {}", raw))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.as_str().trim_end_matches('/').to_string()),
        other => Err(anyhow!("Unsupported STUDIO_UPSTREAM_URL scheme: {}", other)),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_locales(raw: &str) -> Vec<String> {
    let mut locales = Vec::new();
    for item in raw.split(',') {
        let locale = item.trim().to_ascii_lowercase();
        if !locale.is_empty() && !locales.contains(&locale) {
            locales.push(locale);
        }
    }
    locales
}
