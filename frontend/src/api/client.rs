use chrono::Duration;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::rc::Rc;

use super::{dedup::InflightCache, events::AuthFailureHook, types::*};
use crate::config;

pub(crate) const STATUS_DEDUP_WINDOW_SECS: i64 = 5;

/// HTTP boundary to the backend service. Cheap to clone; clones share the
/// auth-failure hook and the request caches.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<String>,
    reissue_url: Option<String>,
    auth_failure: AuthFailureHook,
    pub(super) attendance_status: Rc<InflightCache<AttendanceStatusResponse>>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self::build(None, None)
    }

    pub fn new_with_base_url(base_url: impl Into<String>, reissue_url: impl Into<String>) -> Self {
        Self::build(Some(base_url.into()), Some(reissue_url.into()))
    }

    fn build(base_url: Option<String>, reissue_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            reissue_url,
            auth_failure: AuthFailureHook::new(),
            attendance_status: Rc::new(InflightCache::new(Duration::seconds(
                STATUS_DEDUP_WINDOW_SECS,
            ))),
        }
    }

    pub fn auth_failure(&self) -> &AuthFailureHook {
        &self.auth_failure
    }

    /// Copy without the shared caches, for futures that get stored inside
    /// one of those caches.
    pub(super) fn detached(&self) -> Self {
        Self {
            attendance_status: Rc::new(InflightCache::new(Duration::seconds(
                STATUS_DEDUP_WINDOW_SECS,
            ))),
            ..self.clone()
        }
    }

    pub(super) async fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(base) => base.clone(),
            None => config::resolved().await.api_base_url,
        }
    }

    pub(super) async fn resolved_reissue_url(&self) -> String {
        match &self.reissue_url {
            Some(url) => url.clone(),
            None => config::resolved().await.reissue_url,
        }
    }

    pub(super) fn http_client(&self) -> &Client {
        &self.client
    }

    pub(super) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        with_credentials(builder)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(format!("Request failed: {}", e)))
    }

    /// Sends the request; on 401 asks the reissue route for fresh cookies and
    /// retries once. A 401 that survives the reissue raises auth-failure.
    pub(super) async fn send_with_refresh<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self.send(build()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        match self.reissue().await {
            Ok(()) => {
                let retried = self.send(build()).await?;
                if retried.status() == StatusCode::UNAUTHORIZED {
                    log::warn!("request still unauthorized after reissue");
                    self.auth_failure.notify();
                }
                Ok(retried)
            }
            Err(err) => {
                log::debug!("reissue failed: {}", err);
                self.auth_failure.notify();
                Ok(response)
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn with_credentials(builder: RequestBuilder) -> RequestBuilder {
    builder.fetch_credentials_include()
}

#[cfg(not(target_arch = "wasm32"))]
fn with_credentials(builder: RequestBuilder) -> RequestBuilder {
    builder
}

pub(super) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)))
    } else {
        Err(error_from_response(response).await)
    }
}

pub(super) async fn expect_success(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(error) => error,
        Err(_) if status == StatusCode::UNAUTHORIZED => ApiError::unauthorized("Not signed in"),
        Err(_) => ApiError::unknown(format!("Request failed with status {}", status.as_u16())),
    }
}
