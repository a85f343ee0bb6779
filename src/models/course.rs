use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course the user is enrolled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub description: Option<String>,
    pub role: String,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseContent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub body: Option<String>,
    pub position: i32,
    pub has_children: bool,
    pub available: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub content_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub points: f64,
    pub created: Option<DateTime<Utc>>,
    pub available: bool,
}

/// The user's result in one gradebook column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub column_id: String,
    pub column_name: String,
    pub score: Option<f64>,
    pub possible: f64,
    pub text: Option<String>,
    pub feedback: Option<String>,
    pub exempt: bool,
    pub modified: Option<DateTime<Utc>>,
}

/// Grades of one user in one course with the derived overall percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub course_id: String,
    pub user_id: String,
    /// Two-decimal percentage, e.g. `"90.00"`
    pub overall_percentage: String,
    pub grades: Vec<GradeRecord>,
}

impl GradeSummary {
    /// Builds the summary; the percentage is `0.00` when nothing is gradable
    pub fn from_records(course_id: &str, user_id: &str, grades: Vec<GradeRecord>) -> Self {
        let total_score: f64 = grades.iter().map(|g| g.score.unwrap_or(0.0)).sum();
        let total_possible: f64 = grades.iter().map(|g| g.possible).sum();
        let percentage = if total_possible > 0.0 {
            total_score / total_possible * 100.0
        } else {
            0.0
        };

        Self {
            course_id: course_id.to_string(),
            user_id: user_id.to_string(),
            overall_percentage: format!("{:.2}", percentage),
            grades,
        }
    }
}

/// Announcement posted inside a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAnnouncement {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub creator: Option<String>,
}
