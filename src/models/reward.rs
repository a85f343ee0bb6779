use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A perk students can buy with points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: String,
    pub points_cost: i32,
    pub icon: String,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RewardRedemption {
    pub id: Uuid,
    pub user_id: String,
    pub reward_id: String,
    pub points_spent: i32,
    pub redeemed_at: DateTime<Utc>,
}

/// Status an activity can no longer be registered for
pub const ACTIVITY_COMPLETED: &str = "completed";

/// Campus activity that earns points once attended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub points: i32,
    pub date: NaiveDate,
    /// `upcoming`, `ongoing` or `completed`
    pub status: String,
}

/// Registration for an activity; `points_earned` stays 0 until it is completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRegistration {
    pub id: Uuid,
    pub user_id: String,
    pub activity_id: String,
    pub points_earned: i32,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedPoints {
    pub activity: Activity,
    pub points_earned: i32,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsBalance {
    pub user_id: String,
    pub total_points: i32,
    /// Activity registrations, newest first
    pub earned_points: Vec<EarnedPoints>,
}
