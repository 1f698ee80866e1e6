use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lax" => Some(SameSite::Lax),
            "strict" => Some(SameSite::Strict),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Fallbacks applied when the backend leaves an attribute out.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

/// One cookie as described by the backend's reissue answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    pub value: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub same_site: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub max_age: Option<i64>,
}

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";
pub const DEFAULT_COOKIE_PATH: &str = "/";

pub fn build_cookie(
    name: &str,
    attrs: &CookieAttributes,
    http_only: bool,
    defaults: CookieOptions,
) -> Option<String> {
    if !is_valid_cookie_value(&attrs.value) {
        return None;
    }
    let path = attrs
        .path
        .as_deref()
        .filter(|p| is_valid_attribute(p))
        .unwrap_or(DEFAULT_COOKIE_PATH);
    let same_site = attrs
        .same_site
        .as_deref()
        .and_then(SameSite::parse)
        .unwrap_or(defaults.same_site);
    // Browsers drop SameSite=None cookies that are not Secure.
    let secure = attrs.secure.unwrap_or(defaults.secure) || same_site == SameSite::None;

    let mut cookie = format!("{}={}; Path={}", name, attrs.value, path);
    if let Some(domain) = attrs.domain.as_deref().filter(|d| is_valid_attribute(d)) {
        cookie.push_str(&format!("; Domain={}", domain));
    }
    if let Some(max_age) = attrs.max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str(&format!("; SameSite={}", same_site_value(same_site)));
    if secure {
        cookie.push_str("; Secure");
    }
    Some(cookie)
}

pub fn build_clear_cookie(name: &str, http_only: bool, options: CookieOptions) -> String {
    let mut cookie = format!(
        "{}=; Path={}; Max-Age=-1",
        name, DEFAULT_COOKIE_PATH
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str(&format!("; SameSite={}", same_site_value(options.same_site)));
    if options.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn is_valid_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b';' && b != b',' && b != b'"' && b != b'\\')
}

fn is_valid_attribute(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_graphic() && b != b';')
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}
