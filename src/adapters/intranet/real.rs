use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::adapters::{IntranetApi, UPSTREAM_TIMEOUT};
use crate::config::IntranetSettings;
use crate::error::{AppError, AppResult};
use crate::models::{Announcement, AttendanceRecord, ScheduleEntry, StudentProfile};

/// Intranet REST client authenticated with an `X-API-Key` header
pub struct IntranetClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    schedule: Vec<ScheduleEntry>,
}

#[derive(Deserialize)]
struct AttendanceResponse {
    #[serde(default)]
    attendance: Vec<AttendanceRecord>,
}

#[derive(Deserialize)]
struct AnnouncementsResponse {
    #[serde(default)]
    announcements: Vec<Announcement>,
}

impl IntranetClient {
    pub fn new(settings: &IntranetSettings) -> AppResult<Self> {
        let http = HttpClient::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Intranet API error on {}: {}", path, e);
                AppError::upstream(format!("Failed to fetch {}", what))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Intranet API error on {}: {} {}", path, status, body);
            return Err(AppError::upstream(format!("Failed to fetch {}", what)));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("Intranet API returned an undecodable {}: {}", what, e);
            AppError::upstream(format!("Failed to fetch {}", what))
        })
    }
}

#[async_trait]
impl IntranetApi for IntranetClient {
    async fn student_profile(&self, student_id: &str) -> AppResult<StudentProfile> {
        self.get(
            &format!("/api/students/{}", student_id),
            &[],
            "student profile",
        )
        .await
    }

    async fn student_schedule(
        &self,
        student_id: &str,
        semester: Option<&str>,
    ) -> AppResult<Vec<ScheduleEntry>> {
        let query: Vec<(&str, &str)> = semester.map(|s| ("semester", s)).into_iter().collect();
        let response: ScheduleResponse = self
            .get(
                &format!("/api/students/{}/schedule", student_id),
                &query,
                "schedule",
            )
            .await?;
        Ok(response.schedule)
    }

    async fn student_attendance(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        let response: AttendanceResponse = self
            .get(
                &format!("/api/students/{}/attendance", student_id),
                &[],
                "attendance",
            )
            .await?;
        Ok(response.attendance)
    }

    async fn campus_announcements(&self, category: Option<&str>) -> AppResult<Vec<Announcement>> {
        let query: Vec<(&str, &str)> = category.map(|c| ("category", c)).into_iter().collect();
        let response: AnnouncementsResponse =
            self.get("/api/announcements", &query, "announcements").await?;
        Ok(response.announcements)
    }
}
