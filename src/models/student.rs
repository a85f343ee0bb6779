use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Student identity and academic standing as reported by the intranet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub program: String,
    pub year: u8,
    pub gpa: Option<f64>,
    pub credits_completed: Option<u32>,
    pub total_credits: Option<u32>,
    pub expected_graduation: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Lecture,
    Lab,
    Workshop,
    #[serde(other)]
    Other,
}

/// One weekly class slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub course_code: String,
    pub course_name: String,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u8,
    /// Local time, `HH:MM`
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    pub building: String,
    pub professor: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub course_code: String,
    pub course_name: String,
    pub total_classes: u32,
    pub attended: u32,
    pub percentage: f64,
}

/// Campus-wide announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub published_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub priority: String,
}

/// Schedule grouped by Monday-based day index, each day sorted by start time
pub type WeeklySchedule = BTreeMap<u8, Vec<ScheduleEntry>>;

/// Converts a Sunday-based day index (0 = Sunday, as calendar APIs report it)
/// into the Monday-based index used by schedule records (0 = Monday)
pub fn monday_index_from_sunday_index(sunday_index: u8) -> u8 {
    (sunday_index % 7 + 6) % 7
}

/// Inverse of [`monday_index_from_sunday_index`]
pub fn sunday_index_from_monday_index(monday_index: u8) -> u8 {
    (monday_index % 7 + 1) % 7
}

/// Monday-based index of a calendar weekday
pub fn schedule_day_index(day: Weekday) -> u8 {
    monday_index_from_sunday_index(day.num_days_from_sunday() as u8)
}

pub fn group_by_day(entries: Vec<ScheduleEntry>) -> WeeklySchedule {
    let mut week = WeeklySchedule::new();
    for entry in entries {
        week.entry(entry.day_of_week).or_default().push(entry);
    }
    for day in week.values_mut() {
        day.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }
    week
}

/// Classes held on `today`, in start-time order
pub fn classes_on(entries: Vec<ScheduleEntry>, today: Weekday) -> Vec<ScheduleEntry> {
    group_by_day(entries)
        .remove(&schedule_day_index(today))
        .unwrap_or_default()
}
