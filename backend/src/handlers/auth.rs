use axum::{
    extract::State,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    middleware::request_id::RequestId,
    models::user::{SessionResponse, User},
    state::AppState,
    upstream::{ReissueGrant, UpstreamError},
    utils::cookies::{
        build_clear_cookie, build_cookie, extract_cookie_value, CookieOptions,
        ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
    },
};

type HandlerResult<T> = Result<T, AppError>;

/// Exchanges the http-only refresh cookie for a fresh token pair and
/// re-issues both cookies with the attributes the backend chose.
pub async fn reissue(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
) -> HandlerResult<Response> {
    let options = state.cookie_options();
    let refresh_token = cookie_header(&headers)?
        .and_then(|header| extract_cookie_value(header, REFRESH_COOKIE_NAME));
    let Some(refresh_token) = refresh_token else {
        tracing::debug!("Reissue requested without a refresh cookie");
        return Ok(rejected_session(options));
    };

    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    match state.upstream.reissue(&refresh_token, &request_id).await {
        Ok(grant) => {
            let cookies = grant_cookies(&grant, options)?;
            tracing::info!(request_id = %request_id, "Reissued session cookies");
            let mut response = Json(json!({ "reissued": true })).into_response();
            for cookie in cookies {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Ok(response)
        }
        Err(UpstreamError::Unauthorized) => {
            tracing::info!(request_id = %request_id, "Backend rejected refresh token");
            Ok(rejected_session(options))
        }
        Err(err) => Err(err.into()),
    }
}

/// Resolves the signed-in user for server-rendered pages by forwarding the
/// caller's cookies to the backend.
pub async fn session(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
) -> HandlerResult<Json<SessionResponse>> {
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    let user = resolve_user(&state, &headers, &request_id).await?;
    Ok(Json(SessionResponse { user }))
}

/// Looks up the caller's profile with the cookies they sent. No cookies means
/// no session, without asking the backend.
pub(crate) async fn resolve_user(
    state: &AppState,
    headers: &HeaderMap,
    request_id: &str,
) -> HandlerResult<Option<User>> {
    let Some(cookies) = cookie_header(headers)?.filter(|c| !c.trim().is_empty()) else {
        return Ok(None);
    };
    Ok(state.upstream.fetch_me(cookies, request_id).await?)
}

fn cookie_header(headers: &HeaderMap) -> HandlerResult<Option<&str>> {
    headers
        .get(COOKIE)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::BadRequest("Malformed Cookie header".to_string()))
        })
        .transpose()
}

fn grant_cookies(grant: &ReissueGrant, options: CookieOptions) -> HandlerResult<[HeaderValue; 2]> {
    let access = build_cookie(ACCESS_COOKIE_NAME, &grant.access_token, false, options);
    let refresh = build_cookie(REFRESH_COOKIE_NAME, &grant.refresh_token, true, options);
    match (access, refresh) {
        (Some(access), Some(refresh)) => Ok([header_value(&access)?, header_value(&refresh)?]),
        _ => Err(AppError::BadGateway(
            "backend returned an unusable token value".to_string(),
        )),
    }
}

fn header_value(cookie: &str) -> HandlerResult<HeaderValue> {
    HeaderValue::from_str(cookie)
        .map_err(|_| AppError::BadGateway("backend returned an unusable cookie".to_string()))
}

fn rejected_session(options: CookieOptions) -> Response {
    let mut response = AppError::Unauthorized("Session expired, please sign in again".to_string())
        .into_response();
    for (name, http_only) in [(ACCESS_COOKIE_NAME, false), (REFRESH_COOKIE_NAME, true)] {
        if let Ok(value) = HeaderValue::from_str(&build_clear_cookie(name, http_only, options)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        models::user::User,
        upstream::MockAuthUpstream,
        utils::cookies::CookieAttributes,
    };
    use axum::http::StatusCode;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn state_with(upstream: MockAuthUpstream) -> AppState {
        AppState::new(Config::for_upstream("http://upstream.test"), Arc::new(upstream))
    }

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    fn grant() -> ReissueGrant {
        ReissueGrant {
            access_token: CookieAttributes {
                value: "new-access".into(),
                path: Some("/".into()),
                secure: Some(true),
                same_site: Some("lax".into()),
                domain: None,
                max_age: Some(900),
            },
            refresh_token: CookieAttributes {
                value: "new-refresh".into(),
                path: Some("/".into()),
                secure: Some(true),
                same_site: Some("strict".into()),
                domain: Some("studio.test".into()),
                max_age: Some(1_209_600),
            },
        }
    }

    #[tokio::test]
    async fn reissue_sets_access_and_http_only_refresh_cookies() {
        let mut upstream = MockAuthUpstream::new();
        upstream
            .expect_reissue()
            .with(eq("old-refresh"), eq("req-1"))
            .times(1)
            .returning(|_, _| Ok(grant()));

        let response = reissue(
            State(state_with(upstream)),
            Some(Extension(RequestId("req-1".into()))),
            headers_with_cookie("accessToken=stale; refreshToken=old-refresh"),
        )
        .await
        .expect("reissue ok");

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("accessToken=new-access; Path=/"));
        assert!(cookies[0].contains("Max-Age=900"));
        assert!(!cookies[0].contains("HttpOnly"));
        assert!(cookies[1].starts_with("refreshToken=new-refresh; Path=/"));
        assert!(cookies[1].contains("Domain=studio.test"));
        assert!(cookies[1].contains("HttpOnly"));
        assert!(cookies[1].contains("SameSite=Strict"));
    }

    #[tokio::test]
    async fn reissue_without_refresh_cookie_is_unauthorized_and_skips_backend() {
        let mut upstream = MockAuthUpstream::new();
        upstream.expect_reissue().times(0);

        let response = reissue(
            State(state_with(upstream)),
            None,
            headers_with_cookie("accessToken=stale"),
        )
        .await
        .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookies = set_cookies(&response);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=-1")));
    }

    #[tokio::test]
    async fn reissue_rejected_by_backend_clears_both_cookies() {
        let mut upstream = MockAuthUpstream::new();
        upstream
            .expect_reissue()
            .returning(|_, _| Err(UpstreamError::Unauthorized));

        let response = reissue(
            State(state_with(upstream)),
            None,
            headers_with_cookie("refreshToken=revoked"),
        )
        .await
        .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("accessToken=;"));
        assert!(cookies[1].starts_with("refreshToken=;"));
        assert!(cookies[1].contains("HttpOnly"));
    }

    #[tokio::test]
    async fn reissue_backend_outage_is_bad_gateway() {
        let mut upstream = MockAuthUpstream::new();
        upstream
            .expect_reissue()
            .returning(|_, _| Err(UpstreamError::Status(500)));

        let err = reissue(
            State(state_with(upstream)),
            None,
            headers_with_cookie("refreshToken=r"),
        )
        .await
        .expect_err("bad gateway");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn reissue_with_unusable_token_value_is_bad_gateway() {
        let mut upstream = MockAuthUpstream::new();
        upstream.expect_reissue().returning(|_, _| {
            let mut bad = grant();
            bad.access_token.value = "broken; value".into();
            Ok(bad)
        });

        let err = reissue(
            State(state_with(upstream)),
            None,
            headers_with_cookie("refreshToken=r"),
        )
        .await
        .expect_err("bad gateway");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn session_forwards_cookies_and_returns_user() {
        let mut upstream = MockAuthUpstream::new();
        upstream
            .expect_fetch_me()
            .with(eq("accessToken=a1"), eq(""))
            .returning(|_, _| {
                Ok(Some(User {
                    id: 1,
                    email: "ada@studio.test".into(),
                    name: "Ada".into(),
                    roles: vec!["member".into()],
                    subscription: None,
                }))
            });

        let Json(body) = session(
            State(state_with(upstream)),
            None,
            headers_with_cookie("accessToken=a1"),
        )
        .await
        .expect("session");
        assert_eq!(body.user.map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn session_without_cookies_is_anonymous() {
        let mut upstream = MockAuthUpstream::new();
        upstream.expect_fetch_me().times(0);

        let Json(body) = session(State(state_with(upstream)), None, HeaderMap::new())
            .await
            .expect("session");
        assert!(body.user.is_none());
    }
}
