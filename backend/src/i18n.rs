//! Locale negotiation for localized page routes.

use crate::utils::cookies::extract_cookie_value;

pub const LOCALE_COOKIE_NAME: &str = "NEXT_LOCALE";

/// Locale resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

/// Picks the locale for a request: a supported locale cookie wins, then the
/// best `Accept-Language` match, then `default`.
pub fn negotiate_locale(
    cookie_header: Option<&str>,
    accept_language: Option<&str>,
    supported: &[String],
    default: &str,
) -> String {
    if let Some(locale) = cookie_header
        .and_then(|header| extract_cookie_value(header, LOCALE_COOKIE_NAME))
        .map(|value| value.to_ascii_lowercase())
        .filter(|value| supported.contains(value))
    {
        return locale;
    }

    if let Some(header) = accept_language {
        for tag in ranked_language_tags(header) {
            if let Some(locale) = match_supported(&tag, supported) {
                return locale;
            }
        }
    }

    default.to_string()
}

/// Returns the locale segment the path already starts with, if any.
pub fn locale_prefix<'a>(path: &'a str, supported: &[String]) -> Option<&'a str> {
    let segment = path.trim_start_matches('/').split('/').next()?;
    supported
        .iter()
        .any(|locale| locale.eq_ignore_ascii_case(segment))
        .then_some(segment)
}

fn ranked_language_tags(header: &str) -> Vec<String> {
    let mut ranked: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim().to_ascii_lowercase();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let quality = parts
                .find_map(|param| param.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            (quality > 0.0).then_some((tag, quality))
        })
        .collect();
    // Stable sort keeps header order among equal weights.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(tag, _)| tag).collect()
}

fn match_supported(tag: &str, supported: &[String]) -> Option<String> {
    if let Some(exact) = supported.iter().find(|locale| locale.as_str() == tag) {
        return Some(exact.clone());
    }
    let primary = tag.split('-').next()?;
    supported
        .iter()
        .find(|locale| locale.as_str() == primary)
        .cloned()
}
