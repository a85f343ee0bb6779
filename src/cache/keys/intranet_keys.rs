use std::time::Duration;

/// Intranet student cache key prefix
const STUDENT_PREFIX: &str = "intranet:student:";

/// Intranet announcements cache key prefix
const ANNOUNCEMENTS_PREFIX: &str = "intranet:announcements:";

pub const PROFILE_TTL: Duration = Duration::from_secs(3600);
pub const SCHEDULE_TTL: Duration = Duration::from_secs(86400);
pub const ATTENDANCE_TTL: Duration = Duration::from_secs(3600);
pub const ANNOUNCEMENTS_TTL: Duration = Duration::from_secs(900);

/// Prefix shared by every cached record of one student
pub fn student_prefix(student_id: &str) -> String {
    format!("{}{}:", STUDENT_PREFIX, student_id)
}

pub fn profile_key(student_id: &str) -> String {
    format!("{}profile", student_prefix(student_id))
}

/// An absent filter is encoded as a bare `name=` so it can never equal a
/// caller-supplied value, including an empty one
fn filter(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{}=~{}", name, value),
        None => format!("{}=", name),
    }
}

pub fn schedule_key(student_id: &str, semester: Option<&str>) -> String {
    format!(
        "{}schedule:{}",
        student_prefix(student_id),
        filter("sem", semester)
    )
}

pub fn attendance_key(student_id: &str) -> String {
    format!("{}attendance", student_prefix(student_id))
}

pub fn announcements_key(category: Option<&str>) -> String {
    format!("{}{}", ANNOUNCEMENTS_PREFIX, filter("cat", category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_keys_share_prefix() {
        let prefix = student_prefix("STU2024001");
        assert!(profile_key("STU2024001").starts_with(&prefix));
        assert!(schedule_key("STU2024001", None).starts_with(&prefix));
        assert!(attendance_key("STU2024001").starts_with(&prefix));
    }

    #[test]
    fn test_optional_filters_are_part_of_key() {
        assert_eq!(schedule_key("S1", None), "intranet:student:S1:schedule:sem=");
        assert_ne!(schedule_key("S1", None), schedule_key("S1", Some("Fall 2024")));
        assert_eq!(announcements_key(None), "intranet:announcements:cat=");
        assert_eq!(
            announcements_key(Some("academic")),
            "intranet:announcements:cat=~academic"
        );
    }

    #[test]
    fn test_absent_filter_never_matches_a_literal_value() {
        assert_ne!(announcements_key(None), announcements_key(Some("all")));
        assert_ne!(announcements_key(None), announcements_key(Some("")));
        assert_ne!(schedule_key("S1", None), schedule_key("S1", Some("current")));
        assert_ne!(schedule_key("S1", None), schedule_key("S1", Some("")));
    }
}
