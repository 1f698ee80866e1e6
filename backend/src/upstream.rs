//! Client for the external backend service that owns users and tokens.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    models::user::User,
    utils::cookies::{CookieAttributes, REFRESH_COOKIE_NAME},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream rejected the credentials")]
    Unauthorized,
    #[error("upstream answered with status {0}")]
    Status(u16),
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream response could not be parsed: {0}")]
    InvalidBody(String),
}

/// Fresh token pair returned by the backend's reissue endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReissueGrant {
    pub access_token: CookieAttributes,
    pub refresh_token: CookieAttributes,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthUpstream: Send + Sync {
    /// Exchanges a refresh token for a new access/refresh pair.
    async fn reissue(
        &self,
        refresh_token: &str,
        request_id: &str,
    ) -> Result<ReissueGrant, UpstreamError>;

    /// Resolves the profile behind the forwarded cookies. `Ok(None)` means
    /// the backend does not recognise the session.
    async fn fetch_me(
        &self,
        cookie_header: &str,
        request_id: &str,
    ) -> Result<Option<User>, UpstreamError>;
}

pub struct HttpUpstream {
    client: Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn with_request_id(builder: reqwest::RequestBuilder, request_id: &str) -> reqwest::RequestBuilder {
        if request_id.is_empty() {
            builder
        } else {
            builder.header(REQUEST_ID_HEADER, request_id)
        }
    }
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[async_trait]
impl AuthUpstream for HttpUpstream {
    async fn reissue(
        &self,
        refresh_token: &str,
        request_id: &str,
    ) -> Result<ReissueGrant, UpstreamError> {
        let request = self
            .client
            .post(format!("{}/auth/reissue", self.base_url))
            .header(
                header::COOKIE,
                format!("{}={}", REFRESH_COOKIE_NAME, refresh_token),
            )
            .json(&serde_json::json!({}));
        let response = Self::with_request_id(request, request_id)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if is_auth_rejection(status) {
            return Err(UpstreamError::Unauthorized);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        response
            .json::<ReissueGrant>()
            .await
            .map_err(|e| UpstreamError::InvalidBody(e.to_string()))
    }

    async fn fetch_me(
        &self,
        cookie_header: &str,
        request_id: &str,
    ) -> Result<Option<User>, UpstreamError> {
        let request = self
            .client
            .get(format!("{}/users/me", self.base_url))
            .header(header::COOKIE, cookie_header);
        let response = Self::with_request_id(request, request_id)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if is_auth_rejection(status) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        response
            .json::<User>()
            .await
            .map(Some)
            .map_err(|e| UpstreamError::InvalidBody(e.to_string()))
    }
}
