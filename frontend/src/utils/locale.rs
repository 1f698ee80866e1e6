//! Locale-prefixed paths. Every page lives under `/<locale>/...`; the app
//! server redirects bare paths there, so in-app navigation keeps the prefix.

use super::cookies::CookieStore;

pub const LOCALE_COOKIE_NAME: &str = "NEXT_LOCALE";
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ko", "ja"];

const LOCALE_COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// The supported locale `path` starts with, if any.
pub fn locale_of(path: &str) -> Option<&'static str> {
    let segment = path.trim_start_matches('/').split('/').next()?;
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|locale| locale.eq_ignore_ascii_case(segment))
}

/// Prefixes an app path such as `/login` with the locale of `current_path`.
/// Without a locale the target is returned as is.
pub fn localized_path(current_path: &str, target: &str) -> String {
    match locale_of(current_path) {
        Some(locale) if target == "/" || target.is_empty() => format!("/{}", locale),
        Some(locale) => format!("/{}{}", locale, target),
        None => target.to_string(),
    }
}

/// `current_path` moved under `locale`, replacing any locale it had.
pub fn switch_locale_path(current_path: &str, locale: &str) -> String {
    let rest = match locale_of(current_path) {
        Some(current) => &current_path.trim_start_matches('/')[current.len()..],
        None => current_path.trim_end_matches('/'),
    };
    format!("/{}{}", locale, rest)
}

/// Stores the choice so the app server picks it for bare paths.
pub fn remember_locale(cookies: &dyn CookieStore, locale: &str) {
    cookies.set(LOCALE_COOKIE_NAME, locale, LOCALE_COOKIE_MAX_AGE_SECS);
}

#[cfg(target_arch = "wasm32")]
pub fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn current_path() -> String {
    "/".to_string()
}

/// Full-page navigation to `target`, kept under the current locale.
pub fn redirect(target: &str) {
    let href = localized_path(&current_path(), target);
    if let Some(win) = web_sys::window() {
        let _ = win.location().set_href(&href);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::cookies::MemoryCookies;

    #[test]
    fn locale_is_read_from_first_segment_only() {
        assert_eq!(locale_of("/ko/account"), Some("ko"));
        assert_eq!(locale_of("/JA"), Some("ja"));
        assert_eq!(locale_of("/studio/ko"), None);
        assert_eq!(locale_of("/"), None);
    }

    #[test]
    fn targets_follow_current_locale() {
        assert_eq!(localized_path("/ko/account", "/login"), "/ko/login");
        assert_eq!(localized_path("/ja", "/"), "/ja");
        assert_eq!(localized_path("/account", "/login"), "/login");
    }

    #[test]
    fn switching_replaces_or_adds_the_prefix() {
        assert_eq!(switch_locale_path("/ko/account", "ja"), "/ja/account");
        assert_eq!(switch_locale_path("/ko", "en"), "/en");
        assert_eq!(switch_locale_path("/account", "ko"), "/ko/account");
        assert_eq!(switch_locale_path("/", "ko"), "/ko");
    }

    #[test]
    fn remembered_locale_lands_in_cookie() {
        let cookies = MemoryCookies::new();
        remember_locale(&cookies, "ko");
        assert_eq!(cookies.get(LOCALE_COOKIE_NAME).as_deref(), Some("ko"));
    }
}
