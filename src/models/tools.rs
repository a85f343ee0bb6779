use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::clock;

/// Booking request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoomBooking {
    pub room_name: String,
    pub booking_date: NaiveDate,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoomBooking {
    pub id: Uuid,
    pub user_id: String,
    pub room_name: String,
    pub booking_date: NaiveDate,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl RoomBooking {
    /// Half-open `[start, end)` slots on the same room and day overlap
    pub fn overlaps(&self, room_name: &str, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.room_name == room_name
            && self.booking_date == date
            && self.start_time < end
            && start < self.end_time
    }
}

/// Print request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrintJob {
    pub file_name: String,
    pub location: String,
    pub copies: i32,
    pub pages: i32,
    #[serde(default)]
    pub color: bool,
    #[serde(default)]
    pub duplex: bool,
}

/// Cost is kept in cents
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: Uuid,
    pub job_id: String,
    pub user_id: String,
    pub file_name: String,
    pub location: String,
    pub copies: i32,
    pub pages: i32,
    pub color: bool,
    pub duplex: bool,
    pub cost_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
