use serde_json::json;

use super::{
    client::{parse_json, ApiClient},
    types::{ApiError, AttendanceStatusResponse},
};

impl ApiClient {
    /// Today's attendance status. Calls within a few seconds of each other
    /// share one request.
    pub async fn get_attendance_status(&self) -> Result<AttendanceStatusResponse, ApiError> {
        let api = self.detached();
        self.attendance_status
            .get_or_fetch(move || async move { api.fetch_attendance_status().await })
            .await
    }

    pub async fn check_in(&self) -> Result<AttendanceStatusResponse, ApiError> {
        let base_url = self.resolved_base_url().await;
        let url = format!("{}/attendance/check-in", base_url);
        let response = self
            .send_with_refresh(|| self.http_client().post(&url).json(&json!({})))
            .await?;
        self.attendance_status.invalidate();
        parse_json(response).await
    }

    async fn fetch_attendance_status(&self) -> Result<AttendanceStatusResponse, ApiError> {
        let base_url = self.resolved_base_url().await;
        let url = format!("{}/attendance/status", base_url);
        let response = self
            .send_with_refresh(|| self.http_client().get(&url))
            .await?;
        parse_json(response).await
    }
}
