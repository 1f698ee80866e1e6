use axum::{
    extract::{Request, State},
    http::header::{HeaderName, ACCEPT_LANGUAGE, COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    i18n::{locale_prefix, negotiate_locale, Locale},
    state::AppState,
};

const BYPASS_PREFIXES: &[&str] = &["/auth", "/api", "/health", "/_next", "/static"];

/// Sends unlocalized page paths to their `/<locale>` equivalent and records
/// the resolved locale on every request.
pub async fn locale_routing(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let supported = &state.config.supported_locales;
    let path = req.uri().path().to_string();

    if let Some(prefix) = locale_prefix(&path, supported) {
        let locale = Locale(prefix.to_ascii_lowercase());
        req.extensions_mut().insert(locale);
        return next.run(req).await;
    }

    let locale = negotiate_locale(
        header_string(&req, COOKIE).as_deref(),
        header_string(&req, ACCEPT_LANGUAGE).as_deref(),
        supported,
        &state.config.default_locale,
    );

    if is_bypassed(&path) {
        req.extensions_mut().insert(Locale(locale));
        return next.run(req).await;
    }

    let mut target = format!("/{}{}", locale, if path == "/" { "" } else { path.as_str() });
    if let Some(query) = req.uri().query() {
        target.push('?');
        target.push_str(query);
    }
    tracing::debug!(from = %path, to = %target, "Redirecting to localized path");
    Redirect::temporary(&target).into_response()
}

fn header_string(req: &Request, name: HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_bypassed(path: &str) -> bool {
    let under_prefix = BYPASS_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    });
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    under_prefix || last_segment.contains('.')
}
