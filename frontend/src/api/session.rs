use reqwest::StatusCode;
use serde_json::json;

use super::{
    client::{expect_success, parse_json, ApiClient},
    types::{ApiError, User},
};

impl ApiClient {
    pub async fn get_me(&self) -> Result<User, ApiError> {
        let base_url = self.resolved_base_url().await;
        let url = format!("{}/users/me", base_url);
        let response = self
            .send_with_refresh(|| self.http_client().get(&url))
            .await?;
        parse_json(response).await
    }

    /// Invalidates the server session. Never retried through reissue.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let base_url = self.resolved_base_url().await;
        let response = self
            .send(
                self.http_client()
                    .post(format!("{}/auth/logout", base_url))
                    .json(&json!({})),
            )
            .await?;
        expect_success(response).await
    }

    /// Asks the app server to trade the http-only refresh cookie for new
    /// access/refresh cookies.
    pub async fn reissue(&self) -> Result<(), ApiError> {
        let url = self.resolved_reissue_url().await;
        let response = self
            .send(self.http_client().post(url).json(&json!({})))
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ApiError::unauthorized("Refresh token rejected")),
            status => Err(ApiError::unknown(format!(
                "Reissue failed with status {}",
                status.as_u16()
            ))),
        }
    }
}
