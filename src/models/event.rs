use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::clock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CampusEvent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub event_type: String,
    pub date: NaiveDate,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    pub location: String,
    /// `None` means unlimited
    pub max_attendees: Option<i32>,
    pub ai_points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: String,
    pub user_id: String,
    pub status: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(flatten)]
    pub event: CampusEvent,
    pub registrations: Vec<EventRegistration>,
}

/// One of the caller's registrations together with the event it is for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEventRegistration {
    #[serde(flatten)]
    pub registration: EventRegistration,
    pub event: CampusEvent,
}
