use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const REISSUE_PATH: &str = "/auth/reissue";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub reissue_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub reissue_url: String,
}

static RESOLVED: OnceLock<ResolvedConfig> = OnceLock::new();

impl ResolvedConfig {
    /// Fills gaps in `cfg` with defaults; `origin` is where the app itself is
    /// served from, which hosts the reissue route.
    pub fn from_runtime(cfg: RuntimeConfig, origin: &str) -> Self {
        let api_base_url = cfg
            .api_base_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let reissue_url = cfg
            .reissue_url
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{}{}", origin.trim_end_matches('/'), REISSUE_PATH));
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            reissue_url,
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod source {
    use super::RuntimeConfig;

    fn global_string(obj: &js_sys::Object, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| {
            js_sys::Reflect::get(obj, &(*key).into())
                .ok()
                .filter(|v| !v.is_undefined() && !v.is_null())
                .and_then(|v| v.as_string())
        })
    }

    /// Reads `window.__STUDIO_ENV = { API_BASE_URL, REISSUE_URL }` if the host
    /// page injected it.
    pub fn from_globals() -> Option<RuntimeConfig> {
        let window = web_sys::window()?;
        let any = js_sys::Reflect::get(&window, &"__STUDIO_ENV".into()).ok()?;
        if any.is_undefined() || any.is_null() {
            return None;
        }
        let obj = js_sys::Object::from(any);
        Some(RuntimeConfig {
            api_base_url: global_string(&obj, &["API_BASE_URL", "api_base_url"]),
            reissue_url: global_string(&obj, &["REISSUE_URL", "reissue_url"]),
        })
    }

    pub async fn from_config_json() -> Option<RuntimeConfig> {
        let url = format!("{}/config.json", origin());
        let resp = reqwest::get(url).await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        resp.json::<RuntimeConfig>().await.ok()
    }

    pub fn origin() -> String {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod source {
    use super::RuntimeConfig;

    pub fn from_globals() -> Option<RuntimeConfig> {
        let api_base_url = std::env::var("STUDIO_API_BASE_URL").ok();
        let reissue_url = std::env::var("STUDIO_REISSUE_URL").ok();
        (api_base_url.is_some() || reissue_url.is_some()).then_some(RuntimeConfig {
            api_base_url,
            reissue_url,
        })
    }

    pub async fn from_config_json() -> Option<RuntimeConfig> {
        None
    }

    pub fn origin() -> String {
        "http://localhost:3001".to_string()
    }
}

pub async fn resolved() -> ResolvedConfig {
    if let Some(cached) = RESOLVED.get() {
        return cached.clone();
    }
    let runtime = match source::from_globals() {
        Some(cfg) => cfg,
        None => source::from_config_json().await.unwrap_or_default(),
    };
    let config = ResolvedConfig::from_runtime(runtime, &source::origin());
    log::info!(
        "runtime config: api={} reissue={}",
        config.api_base_url,
        config.reissue_url
    );
    RESOLVED.get_or_init(|| config).clone()
}

pub async fn init() {
    let _ = resolved().await;
}
