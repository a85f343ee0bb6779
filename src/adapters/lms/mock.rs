use async_trait::async_trait;

use crate::adapters::LmsApi;
use crate::error::AppResult;
use crate::mock::{Simulator, fixtures};
use crate::models::{Assignment, Course, CourseAnnouncement, CourseContent, GradeRecord};

const UPSTREAM: &str = "Blackboard";

/// LMS backed by fixture data
pub struct MockLms {
    simulator: Simulator,
}

impl MockLms {
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl LmsApi for MockLms {
    async fn user_courses(&self, user_id: &str) -> AppResult<Vec<Course>> {
        tracing::info!("[MOCK] Fetching courses for user: {}", user_id);
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::courses())
    }

    async fn course_content(&self, course_id: &str) -> AppResult<Vec<CourseContent>> {
        tracing::info!("[MOCK] Fetching content for course: {}", course_id);
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::course_content())
    }

    async fn course_assignments(&self, course_id: &str) -> AppResult<Vec<Assignment>> {
        tracing::info!("[MOCK] Fetching assignments for course: {}", course_id);
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::assignments(course_id))
    }

    async fn grade_records(&self, course_id: &str, user_id: &str) -> AppResult<Vec<GradeRecord>> {
        tracing::info!(
            "[MOCK] Fetching grades for course: {}, user: {}",
            course_id,
            user_id
        );
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::grades(course_id))
    }

    async fn course_announcements(&self, course_id: &str) -> AppResult<Vec<CourseAnnouncement>> {
        tracing::info!("[MOCK] Fetching announcements for course: {}", course_id);
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::course_announcements())
    }
}
