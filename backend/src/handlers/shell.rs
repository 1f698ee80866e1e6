use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::Html,
    Extension,
};

use crate::{
    error::AppError,
    handlers::auth::resolve_user,
    i18n::{locale_prefix, Locale},
    middleware::request_id::RequestId,
    models::user::{SessionResponse, User},
    state::AppState,
};

pub const SESSION_SCRIPT_ID: &str = "studio-session";
const FRONTEND_ENTRY: &str = "/static/studio_frontend.js";

/// Serves the app shell for a localized page. The signed-in user, if any, is
/// embedded so the client can hydrate without a second round trip.
pub async fn shell(
    State(state): State<AppState>,
    locale: Option<Extension<Locale>>,
    request_id: Option<Extension<RequestId>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let Some(Extension(Locale(locale))) = locale
        .filter(|_| locale_prefix(uri.path(), &state.config.supported_locales).is_some())
    else {
        return Err(AppError::NotFound("Resource not found".to_string()));
    };

    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    let user = match resolve_user(&state, &headers, &request_id).await {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = ?err, "Rendering shell without session");
            None
        }
    };

    Ok(Html(render_shell(&locale, user)))
}

fn render_shell(locale: &str, user: Option<User>) -> String {
    let session = serde_json::to_string(&SessionResponse { user })
        .unwrap_or_else(|_| r#"{"user":null}"#.to_string())
        .replace("</", "<\\/");
    format!(
        r#"<!DOCTYPE html>
<html lang="{locale}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Studio</title>
<script id="{id}" type="application/json">{session}</script>
<script type="module">import init from "{entry}"; init();</script>
</head>
<body></body>
</html>
"#,
        locale = locale,
        id = SESSION_SCRIPT_ID,
        session = session,
        entry = FRONTEND_ENTRY,
    )
}
