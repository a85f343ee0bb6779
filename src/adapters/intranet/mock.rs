use async_trait::async_trait;

use crate::adapters::IntranetApi;
use crate::error::AppResult;
use crate::mock::{Simulator, fixtures};
use crate::models::{Announcement, AttendanceRecord, ScheduleEntry, StudentProfile};

const UPSTREAM: &str = "Intranet";

/// Intranet backed by fixture data
pub struct MockIntranet {
    simulator: Simulator,
}

impl MockIntranet {
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl IntranetApi for MockIntranet {
    /// Unknown student ids resolve to the first fixture student
    async fn student_profile(&self, student_id: &str) -> AppResult<StudentProfile> {
        tracing::info!("[MOCK] Fetching profile for student: {}", student_id);
        self.simulator.call(UPSTREAM).await?;

        let student = fixtures::find_student(student_id).unwrap_or(&fixtures::STUDENTS[0]);
        Ok(student.profile())
    }

    async fn student_schedule(
        &self,
        student_id: &str,
        semester: Option<&str>,
    ) -> AppResult<Vec<ScheduleEntry>> {
        tracing::info!(
            "[MOCK] Fetching schedule for student: {}, semester: {}",
            student_id,
            semester.unwrap_or("current")
        );
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::schedule())
    }

    async fn student_attendance(&self, student_id: &str) -> AppResult<Vec<AttendanceRecord>> {
        tracing::info!("[MOCK] Fetching attendance for student: {}", student_id);
        self.simulator.call(UPSTREAM).await?;

        Ok(fixtures::attendance())
    }

    async fn campus_announcements(&self, category: Option<&str>) -> AppResult<Vec<Announcement>> {
        tracing::info!(
            "[MOCK] Fetching announcements, category: {}",
            category.unwrap_or("all")
        );
        self.simulator.call(UPSTREAM).await?;

        let mut announcements = fixtures::announcements();
        if let Some(category) = category {
            announcements.retain(|a| a.category == category);
        }
        Ok(announcements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_unknown_student_falls_back_to_first_fixture() {
        let intranet = MockIntranet::new(Simulator::instant());
        let profile = intranet.student_profile("STU-missing").await.unwrap();
        assert_eq!(profile.student_id, "STU2024001");
    }

    #[tokio::test]
    async fn test_announcements_filtered_by_category() {
        let intranet = MockIntranet::new(Simulator::instant());
        let academic = intranet.campus_announcements(Some("academic")).await.unwrap();
        assert_eq!(academic.len(), 1);
        assert_eq!(academic[0].id, "ann-002");
        assert_eq!(intranet.campus_announcements(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_simulated_failure_surfaces_as_upstream_error() {
        let intranet = MockIntranet::new(Simulator::instant().with_failure_rate(1.0));
        let err = intranet.student_attendance("STU2024001").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_delay_is_applied() {
        let settings = crate::config::MockSettings {
            enabled: true,
            delay_ms: 300,
            failure_rate: 0.0,
        };
        let intranet = MockIntranet::new(Simulator::new(&settings));

        let start = tokio::time::Instant::now();
        intranet.student_schedule("STU2024001", None).await.unwrap();
        assert!(start.elapsed() >= std::time::Duration::from_millis(300));
    }
}
