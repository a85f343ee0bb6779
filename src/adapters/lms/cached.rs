use async_trait::async_trait;

use crate::adapters::LmsApi;
use crate::cache::Cache;
use crate::cache::keys::lms_keys::{
    self, ANNOUNCEMENTS_TTL, ASSIGNMENTS_TTL, CONTENT_TTL, COURSES_TTL, GRADES_TTL,
};
use crate::error::AppResult;
use crate::models::{Assignment, Course, CourseAnnouncement, CourseContent, GradeRecord};

/// Read-through cache in front of any LMS variant
///
/// Grade summaries are never stored: only the records are cached and
/// [`LmsApi::user_grades`] rebuilds the percentage from them on every call.
pub struct CachedLms<A: LmsApi> {
    inner: A,
    cache: Cache,
}

impl<A: LmsApi> CachedLms<A> {
    pub fn new(inner: A, cache: Cache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<A: LmsApi> LmsApi for CachedLms<A> {
    async fn user_courses(&self, user_id: &str) -> AppResult<Vec<Course>> {
        let key = lms_keys::courses_key(user_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let courses = self.inner.user_courses(user_id).await?;
        self.cache.set(&key, &courses, Some(COURSES_TTL)).await;
        Ok(courses)
    }

    async fn course_content(&self, course_id: &str) -> AppResult<Vec<CourseContent>> {
        let key = lms_keys::content_key(course_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let content = self.inner.course_content(course_id).await?;
        self.cache.set(&key, &content, Some(CONTENT_TTL)).await;
        Ok(content)
    }

    async fn course_assignments(&self, course_id: &str) -> AppResult<Vec<Assignment>> {
        let key = lms_keys::assignments_key(course_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let assignments = self.inner.course_assignments(course_id).await?;
        self.cache.set(&key, &assignments, Some(ASSIGNMENTS_TTL)).await;
        Ok(assignments)
    }

    async fn grade_records(&self, course_id: &str, user_id: &str) -> AppResult<Vec<GradeRecord>> {
        let key = lms_keys::grades_key(course_id, user_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let grades = self.inner.grade_records(course_id, user_id).await?;
        self.cache.set(&key, &grades, Some(GRADES_TTL)).await;
        Ok(grades)
    }

    async fn course_announcements(&self, course_id: &str) -> AppResult<Vec<CourseAnnouncement>> {
        let key = lms_keys::announcements_key(course_id);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit: {}", key);
            return Ok(cached);
        }

        let announcements = self.inner.course_announcements(course_id).await?;
        self.cache
            .set(&key, &announcements, Some(ANNOUNCEMENTS_TTL))
            .await;
        Ok(announcements)
    }
}
