//! Blackboard-style LMS REST client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use reqwest::{Client as HttpClient, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::adapters::{LmsApi, UPSTREAM_TIMEOUT};
use crate::config::LmsSettings;
use crate::error::{AppError, AppResult};
use crate::models::{Assignment, Course, CourseAnnouncement, CourseContent, GradeRecord};

/// Leading path segments of every Blackboard REST endpoint
const API_PREFIX: [&str; 3] = ["learn", "api", "public"];

/// Tokens this close to expiry are refreshed before use
const TOKEN_EXPIRY_BUFFER_MINUTES: i64 = 5;

/// LMS client using the OAuth2 client-credentials grant
pub struct LmsClient {
    http: HttpClient,
    base: Url,
    api_key: String,
    api_secret: String,
    token: RwLock<Option<AccessToken>>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        self.expires_at - chrono::Duration::minutes(TOKEN_EXPIRY_BUFFER_MINUTES) > Utc::now()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Paged list envelope; only the first page is read
#[derive(Deserialize)]
struct Results<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Availability {
    #[serde(default)]
    available: String,
}

impl Availability {
    fn is_available(&self) -> bool {
        self.available == "Yes"
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Membership {
    course_id: String,
    #[serde(default)]
    course_role_id: String,
    created: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LmsCourse {
    id: String,
    course_id: String,
    name: String,
    description: Option<String>,
    availability: Option<Availability>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LmsContent {
    id: String,
    title: String,
    description: Option<String>,
    body: Option<String>,
    #[serde(default)]
    position: i32,
    #[serde(default)]
    has_children: bool,
    availability: Option<Availability>,
    created: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnScore {
    #[serde(default)]
    possible: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnGrading {
    due: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeColumn {
    id: String,
    name: String,
    content_id: Option<String>,
    description: Option<String>,
    grading: Option<ColumnGrading>,
    score: Option<ColumnScore>,
    created: Option<DateTime<Utc>>,
    availability: Option<Availability>,
}

impl GradeColumn {
    fn possible(&self) -> f64 {
        self.score.as_ref().map(|s| s.possible).unwrap_or(0.0)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserGrade {
    score: Option<f64>,
    text: Option<String>,
    feedback: Option<String>,
    #[serde(default)]
    exempt: bool,
    modified: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LmsAnnouncement {
    id: String,
    title: String,
    body: Option<String>,
    created: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
    creator: Option<String>,
}

impl LmsClient {
    pub fn new(settings: &LmsSettings) -> AppResult<Self> {
        let http = HttpClient::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let base = Url::parse(&settings.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                AppError::Internal(format!("invalid Blackboard API URL: {}", settings.api_url))
            })?;

        Ok(Self {
            http,
            base,
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
            token: RwLock::new(None),
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(AppError::Validation(format!("Invalid identifier: {:?}", bad)));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Blackboard API URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn versioned(&self, version: &str, rest: &[&str]) -> AppResult<Url> {
        let mut segments: Vec<&str> = API_PREFIX.to_vec();
        segments.push(version);
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn v1(&self, rest: &[&str]) -> AppResult<Url> {
        self.versioned("v1", rest)
    }

    fn v2(&self, rest: &[&str]) -> AppResult<Url> {
        self.versioned("v2", rest)
    }

    /// Returns a token that stays valid for at least the expiry buffer
    async fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.authenticate().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    async fn authenticate(&self) -> AppResult<AccessToken> {
        let url = self.v1(&["oauth2", "token"])?;
        let failed = |detail: String| {
            tracing::error!("Blackboard authentication failed: {}", detail);
            AppError::upstream("Failed to authenticate with Blackboard")
        };

        let response = self
            .http
            .post(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("status {}", response.status())));
        }

        let token: TokenResponse = response.json().await.map_err(|e| failed(e.to_string()))?;
        tracing::info!("Blackboard authentication successful");

        Ok(AccessToken {
            value: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
        })
    }

    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn send(&self, url: &Url) -> AppResult<Response> {
        let token = self.access_token().await?;

        self.http
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Blackboard API error on {}: {}", url.path(), e);
                AppError::upstream(format!("Blackboard request failed: {}", url.path()))
            })
    }

    /// GET with one re-authentication and retry on 401. `Ok(None)` means the
    /// upstream answered 404; every other non-2xx is an upstream failure.
    async fn fetch<T: DeserializeOwned>(&self, url: &Url) -> AppResult<Option<T>> {
        let mut response = self.send(url).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Blackboard rejected the access token, re-authenticating");
            self.invalidate_token().await;
            response = self.send(url).await?;
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Blackboard API error on {}: {} {}", url.path(), status, body);
            return Err(AppError::upstream(format!(
                "Blackboard returned {} for {}",
                status,
                url.path()
            )));
        }

        response.json::<T>().await.map(Some).map_err(|e| {
            tracing::error!("Blackboard returned an undecodable body for {}: {}", url.path(), e);
            AppError::upstream(format!("Blackboard returned an invalid body for {}", url.path()))
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &Url) -> AppResult<T> {
        self.fetch(url).await?.ok_or_else(|| {
            tracing::error!("Blackboard API error on {}: 404 Not Found", url.path());
            AppError::upstream(format!("Blackboard returned 404 Not Found for {}", url.path()))
        })
    }

    async fn list<T: DeserializeOwned>(&self, url: &Url) -> AppResult<Vec<T>> {
        let page: Results<T> = self.get(url).await?;
        Ok(page.results)
    }

    async fn grade_columns(&self, course_id: &str) -> AppResult<Vec<GradeColumn>> {
        let url = self.v2(&["courses", course_id, "gradebook", "columns"])?;
        self.list(&url).await
    }
}

/// Fails the whole fan-out only when every item of a non-empty set failed
fn ensure_partial_success(total: usize, failed: usize, what: &str) -> AppResult<()> {
    if total > 0 && failed == total {
        return Err(AppError::upstream(format!(
            "Failed to fetch {}: all {} upstream requests failed",
            what, total
        )));
    }
    Ok(())
}

#[async_trait]
impl LmsApi for LmsClient {
    async fn user_courses(&self, user_id: &str) -> AppResult<Vec<Course>> {
        let memberships: Vec<Membership> = self
            .list(&self.v1(&["users", user_id, "courses"])?)
            .await?;

        let details = join_all(memberships.iter().map(|membership| async move {
            let course = match self.v1(&["courses", membership.course_id.as_str()]) {
                Ok(url) => self.get::<LmsCourse>(&url).await,
                Err(e) => Err(e),
            };
            match course {
                Ok(course) => Some(Course {
                    id: course.id,
                    course_id: course.course_id,
                    name: course.name,
                    description: course.description,
                    role: membership.course_role_id.clone(),
                    enrollment_date: membership.created,
                    available: course.availability.is_some_and(|a| a.is_available()),
                }),
                Err(e) => {
                    tracing::warn!("Failed to fetch course {}: {}", membership.course_id, e);
                    None
                }
            }
        }))
        .await;

        let courses: Vec<Course> = details.into_iter().flatten().collect();
        ensure_partial_success(memberships.len(), memberships.len() - courses.len(), "courses")?;
        Ok(courses)
    }

    async fn course_content(&self, course_id: &str) -> AppResult<Vec<CourseContent>> {
        let contents: Vec<LmsContent> = self
            .list(&self.v1(&["courses", course_id, "contents"])?)
            .await?;

        Ok(contents
            .into_iter()
            .map(|content| CourseContent {
                id: content.id,
                title: content.title,
                description: content.description,
                body: content.body,
                position: content.position,
                has_children: content.has_children,
                available: content.availability.is_some_and(|a| a.is_available()),
                created: content.created,
                modified: content.modified,
            })
            .collect())
    }

    /// Only gradebook columns linked to course content count as assignments
    async fn course_assignments(&self, course_id: &str) -> AppResult<Vec<Assignment>> {
        let columns = self.grade_columns(course_id).await?;

        Ok(columns
            .into_iter()
            .filter(|column| column.content_id.is_some())
            .map(|column| Assignment {
                points: column.possible(),
                available: column.availability.as_ref().is_some_and(|a| a.is_available()),
                due: column.grading.as_ref().and_then(|g| g.due),
                id: column.id,
                content_id: column.content_id,
                name: column.name,
                description: column.description,
                created: column.created,
            })
            .collect())
    }

    async fn grade_records(&self, course_id: &str, user_id: &str) -> AppResult<Vec<GradeRecord>> {
        let columns = self.grade_columns(course_id).await?;

        let outcomes = join_all(columns.iter().map(|column| async move {
            let url = self.v2(&[
                "courses",
                course_id,
                "gradebook",
                "columns",
                column.id.as_str(),
                "users",
                user_id,
            ])?;
            let grade = self.fetch::<UserGrade>(&url).await?;
            Ok::<_, AppError>(grade.map(|grade| GradeRecord {
                column_id: column.id.clone(),
                column_name: column.name.clone(),
                score: grade.score,
                possible: column.possible(),
                text: grade.text,
                feedback: grade.feedback,
                exempt: grade.exempt,
                modified: grade.modified,
            }))
        }))
        .await;

        let mut grades = Vec::with_capacity(columns.len());
        let mut failed = 0;
        for (column, outcome) in columns.iter().zip(outcomes) {
            match outcome {
                Ok(Some(grade)) => grades.push(grade),
                // Not graded yet
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to fetch grade for column {}: {}", column.id, e);
                    failed += 1;
                }
            }
        }

        ensure_partial_success(columns.len(), failed, "grades")?;
        Ok(grades)
    }

    async fn course_announcements(&self, course_id: &str) -> AppResult<Vec<CourseAnnouncement>> {
        let announcements: Vec<LmsAnnouncement> = self
            .list(&self.v1(&["courses", course_id, "announcements"])?)
            .await?;

        Ok(announcements
            .into_iter()
            .map(|a| CourseAnnouncement {
                id: a.id,
                title: a.title,
                body: a.body,
                created: a.created,
                modified: a.modified,
                creator: a.creator,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_inside_buffer_is_stale() {
        let stale = AccessToken {
            value: "t".into(),
            expires_at: Utc::now() + chrono::Duration::minutes(4),
        };
        let fresh = AccessToken {
            value: "t".into(),
            expires_at: Utc::now() + chrono::Duration::minutes(30),
        };
        assert!(!stale.is_fresh());
        assert!(fresh.is_fresh());
    }

    #[test]
    fn test_partial_success_rule() {
        assert!(ensure_partial_success(0, 0, "x").is_ok());
        assert!(ensure_partial_success(5, 2, "x").is_ok());
        assert!(ensure_partial_success(3, 3, "x").is_err());
    }
}
