use std::time::Duration;

/// LMS per-user cache key prefix
const USER_PREFIX: &str = "lms:user:";

/// LMS per-course cache key prefix
const COURSE_PREFIX: &str = "lms:course:";

pub const COURSES_TTL: Duration = Duration::from_secs(3600);
pub const CONTENT_TTL: Duration = Duration::from_secs(1800);
pub const ASSIGNMENTS_TTL: Duration = Duration::from_secs(900);
pub const GRADES_TTL: Duration = Duration::from_secs(900);
pub const ANNOUNCEMENTS_TTL: Duration = Duration::from_secs(600);

/// Prefix shared by every cached record of one course
pub fn course_prefix(course_id: &str) -> String {
    format!("{}{}:", COURSE_PREFIX, course_id)
}

pub fn courses_key(user_id: &str) -> String {
    format!("{}{}:courses", USER_PREFIX, user_id)
}

pub fn content_key(course_id: &str) -> String {
    format!("{}content", course_prefix(course_id))
}

pub fn assignments_key(course_id: &str) -> String {
    format!("{}assignments", course_prefix(course_id))
}

pub fn grades_key(course_id: &str, user_id: &str) -> String {
    format!("{}grades:{}", course_prefix(course_id), user_id)
}

pub fn announcements_key(course_id: &str) -> String {
    format!("{}announcements", course_prefix(course_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grades_key_includes_both_ids() {
        assert_eq!(grades_key("course-001", "u1"), "lms:course:course-001:grades:u1");
        assert_ne!(grades_key("course-001", "u1"), grades_key("course-001", "u2"));
    }

    #[test]
    fn test_course_keys_share_prefix() {
        let prefix = course_prefix("c1");
        for key in [
            content_key("c1"),
            assignments_key("c1"),
            grades_key("c1", "u"),
            announcements_key("c1"),
        ] {
            assert!(key.starts_with(&prefix), "{key}");
        }
        assert!(!courses_key("c1").starts_with(&prefix));
    }
}
