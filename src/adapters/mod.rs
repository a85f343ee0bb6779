// External adapters
// Capability traits over the school intranet and the LMS. Each has a mock and a real
// variant; both are wrapped in a caching decorator and selected once at start-up.

pub mod intranet;
pub mod lms;

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::Cache;
use crate::cache::keys::{intranet_keys, lms_keys};
use crate::config::Config;
use crate::error::AppResult;
use crate::mock::Simulator;
use crate::models::{
    Announcement, Assignment, AttendanceRecord, Course, CourseAnnouncement, CourseContent,
    GradeRecord, GradeSummary, ScheduleEntry, StudentProfile,
};

pub use intranet::{CachedIntranet, IntranetClient, MockIntranet};
pub use lms::{CachedLms, LmsClient, MockLms};

/// Upstream HTTP timeout shared by the real variants
pub const UPSTREAM_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// School intranet capabilities
#[async_trait]
pub trait IntranetApi: Send + Sync {
    async fn student_profile(&self, student_id: &str) -> AppResult<StudentProfile>;

    /// `semester = None` means the current semester
    async fn student_schedule(
        &self,
        student_id: &str,
        semester: Option<&str>,
    ) -> AppResult<Vec<ScheduleEntry>>;

    async fn student_attendance(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>>;

    /// `category = None` means every category
    async fn campus_announcements(&self, category: Option<&str>) -> AppResult<Vec<Announcement>>;
}

/// LMS capabilities
#[async_trait]
pub trait LmsApi: Send + Sync {
    async fn user_courses(&self, user_id: &str) -> AppResult<Vec<Course>>;

    async fn course_content(&self, course_id: &str) -> AppResult<Vec<CourseContent>>;

    async fn course_assignments(&self, course_id: &str) -> AppResult<Vec<Assignment>>;

    /// Raw gradebook entries of one user; columns without a grade are omitted
    async fn grade_records(&self, course_id: &str, user_id: &str) -> AppResult<Vec<GradeRecord>>;

    async fn course_announcements(&self, course_id: &str) -> AppResult<Vec<CourseAnnouncement>>;

    /// Grades with the overall percentage, rebuilt from the records on every call
    async fn user_grades(&self, course_id: &str, user_id: &str) -> AppResult<GradeSummary> {
        let grades = self.grade_records(course_id, user_id).await?;
        Ok(GradeSummary::from_records(course_id, user_id, grades))
    }
}

/// The adapter pair handed to the services
#[derive(Clone)]
pub struct Adapters {
    pub intranet: Arc<dyn IntranetApi>,
    pub lms: Arc<dyn LmsApi>,
}

impl Adapters {
    /// Picks the mock or real variants from the mock-mode flag, each behind the cache
    pub fn build(config: &Config, cache: &Cache) -> AppResult<Self> {
        if config.mock.enabled {
            tracing::info!("Using mock intranet and LMS adapters");
            let simulator = Simulator::new(&config.mock);
            return Ok(Self {
                intranet: Arc::new(CachedIntranet::new(
                    MockIntranet::new(simulator.clone()),
                    cache.clone(),
                )),
                lms: Arc::new(CachedLms::new(MockLms::new(simulator), cache.clone())),
            });
        }

        Ok(Self {
            intranet: Arc::new(CachedIntranet::new(
                IntranetClient::new(&config.intranet)?,
                cache.clone(),
            )),
            lms: Arc::new(CachedLms::new(LmsClient::new(&config.lms)?, cache.clone())),
        })
    }
}

/// Drops every cached intranet record of the student, then refetches the profile
pub async fn refresh_student(
    intranet: &dyn IntranetApi,
    cache: &Cache,
    student_id: &str,
) -> AppResult<StudentProfile> {
    cache
        .delete_by_prefix(&intranet_keys::student_prefix(student_id))
        .await;
    intranet.student_profile(student_id).await
}

/// Drops every cached LMS record of the course
pub async fn invalidate_course(cache: &Cache, course_id: &str) {
    cache
        .delete_by_prefix(&lms_keys::course_prefix(course_id))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_selection_serves_fixtures() {
        let config = Config::for_mock();
        let adapters = Adapters::build(&config, &Cache::in_memory()).unwrap();

        let profile = adapters.intranet.student_profile("STU2024002").await.unwrap();
        assert_eq!(profile.first_name, "Jane");

        let courses = adapters.lms.user_courses("user-001").await.unwrap();
        assert_eq!(courses.len(), 5);
    }

    #[tokio::test]
    async fn test_refresh_student_drops_cached_records() {
        let cache = Cache::in_memory();
        let adapters = Adapters::build(&Config::for_mock(), &cache).unwrap();

        adapters.intranet.student_profile("STU2024001").await.unwrap();
        adapters
            .intranet
            .student_schedule("STU2024001", None)
            .await
            .unwrap();
        let schedule_key = intranet_keys::schedule_key("STU2024001", None);
        assert!(cache.exists(&schedule_key).await);

        let profile = refresh_student(adapters.intranet.as_ref(), &cache, "STU2024001")
            .await
            .unwrap();
        assert_eq!(profile.student_id, "STU2024001");
        assert!(!cache.exists(&schedule_key).await);
        assert!(cache.exists(&intranet_keys::profile_key("STU2024001")).await);
    }

    #[tokio::test]
    async fn test_invalidate_course_keeps_other_courses() {
        let cache = Cache::in_memory();
        let adapters = Adapters::build(&Config::for_mock(), &cache).unwrap();

        adapters.lms.course_content("course-001").await.unwrap();
        adapters.lms.course_content("course-002").await.unwrap();

        invalidate_course(&cache, "course-001").await;

        assert!(!cache.exists(&lms_keys::content_key("course-001")).await);
        assert!(cache.exists(&lms_keys::content_key("course-002")).await);
    }
}
