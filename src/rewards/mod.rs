// Rewards ledger
// Points balances, activity registration and reward redemption. A redemption
// records the purchase and deducts the points as one unit of work.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::mock::fixtures;
use crate::models::{
    ACTIVITY_COMPLETED, Activity, ActivityRegistration, EarnedPoints, PointsBalance, Reward,
    RewardRedemption,
};

#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Available rewards, cheapest first
    async fn list_rewards(&self) -> AppResult<Vec<Reward>>;

    /// Balance plus every activity registration with its activity
    async fn points_balance(&self, user_id: &str) -> AppResult<PointsBalance>;

    /// Point-earning activities, latest date first
    async fn activities(&self) -> AppResult<Vec<Activity>>;

    /// Registers the user; points are credited once the activity completes
    async fn register_activity(
        &self,
        user_id: &str,
        activity_id: &str,
    ) -> AppResult<ActivityRegistration>;

    async fn redeem(&self, user_id: &str, reward_id: &str) -> AppResult<RewardRedemption>;

    /// Past redemptions of the user, newest first
    async fn redemptions(&self, user_id: &str) -> AppResult<Vec<RewardRedemption>>;
}

fn check_redeemable(balance: i32, reward: &Reward) -> AppResult<()> {
    if !reward.available {
        return Err(AppError::Validation("Reward is not available".to_string()));
    }
    if balance < reward.points_cost {
        return Err(AppError::Validation("Insufficient AI Points".to_string()));
    }
    Ok(())
}

fn ensure_open(activity: &Activity) -> AppResult<()> {
    if activity.status == ACTIVITY_COMPLETED {
        return Err(AppError::Validation(
            "Cannot register for completed activity".to_string(),
        ));
    }
    Ok(())
}

fn already_registered() -> AppError {
    AppError::Validation("Already registered for this activity".to_string())
}

/// A registration joined with its activity
#[derive(FromRow)]
struct EarnedRow {
    points_earned: i32,
    earned_at: DateTime<Utc>,
    id: String,
    name: String,
    description: String,
    category: String,
    points: i32,
    date: NaiveDate,
    status: String,
}

impl From<EarnedRow> for EarnedPoints {
    fn from(row: EarnedRow) -> Self {
        EarnedPoints {
            activity: Activity {
                id: row.id,
                name: row.name,
                description: row.description,
                category: row.category,
                points: row.points,
                date: row.date,
                status: row.status,
            },
            points_earned: row.points_earned,
            earned_at: row.earned_at,
        }
    }
}

pub struct PgRewardStore {
    db: Arc<PgPool>,
}

impl PgRewardStore {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RewardStore for PgRewardStore {
    async fn list_rewards(&self) -> AppResult<Vec<Reward>> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT id, name, description, points_cost, icon, available
            FROM rewards
            WHERE available = TRUE
            ORDER BY points_cost ASC
            "#,
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(rewards)
    }

    async fn points_balance(&self, user_id: &str) -> AppResult<PointsBalance> {
        let total_points: i32 = sqlx::query_scalar("SELECT ai_points FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let earned = sqlx::query_as::<_, EarnedRow>(
            r#"
            SELECT r.points_earned, r.earned_at,
                   a.id, a.name, a.description, a.category, a.points, a.date, a.status
            FROM activity_registrations r
            JOIN activities a ON a.id = r.activity_id
            WHERE r.user_id = $1
            ORDER BY r.earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(PointsBalance {
            user_id: user_id.to_string(),
            total_points,
            earned_points: earned.into_iter().map(EarnedPoints::from).collect(),
        })
    }

    async fn activities(&self) -> AppResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, name, description, category, points, date, status
            FROM activities
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(activities)
    }

    async fn register_activity(
        &self,
        user_id: &str,
        activity_id: &str,
    ) -> AppResult<ActivityRegistration> {
        let mut tx = self.db.begin().await?;

        let user: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let activity = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, name, description, category, points, date, status
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;
        ensure_open(&activity)?;

        // The unique (user_id, activity_id) pair settles concurrent duplicates
        let registration = sqlx::query_as::<_, ActivityRegistration>(
            r#"
            INSERT INTO activity_registrations (id, user_id, activity_id, points_earned, earned_at)
            VALUES ($1, $2, $3, 0, NOW())
            ON CONFLICT (user_id, activity_id) DO NOTHING
            RETURNING id, user_id, activity_id, points_earned, earned_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(activity_id)
        .fetch_optional(&mut *tx)
        .await?;

        let registration = registration.ok_or_else(already_registered)?;

        tx.commit().await?;
        Ok(registration)
    }

    async fn redeem(&self, user_id: &str, reward_id: &str) -> AppResult<RewardRedemption> {
        let mut tx = self.db.begin().await?;

        // Row lock keeps concurrent redemptions from spending the same points
        let balance: Option<i32> =
            sqlx::query_scalar("SELECT ai_points FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let balance = balance.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let reward = sqlx::query_as::<_, Reward>(
            "SELECT id, name, description, points_cost, icon, available FROM rewards WHERE id = $1",
        )
        .bind(reward_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Reward not found".to_string()))?;

        check_redeemable(balance, &reward)?;

        let redemption = sqlx::query_as::<_, RewardRedemption>(
            r#"
            INSERT INTO reward_redemptions (id, user_id, reward_id, points_spent, redeemed_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, reward_id, points_spent, redeemed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(reward_id)
        .bind(reward.points_cost)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET ai_points = ai_points - $1 WHERE id = $2")
            .bind(reward.points_cost)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(redemption)
    }

    async fn redemptions(&self, user_id: &str) -> AppResult<Vec<RewardRedemption>> {
        let redemptions = sqlx::query_as::<_, RewardRedemption>(
            r#"
            SELECT id, user_id, reward_id, points_spent, redeemed_at
            FROM reward_redemptions
            WHERE user_id = $1
            ORDER BY redeemed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        Ok(redemptions)
    }
}

#[derive(Default)]
struct Ledger {
    points: HashMap<String, i32>,
    rewards: Vec<Reward>,
    redemptions: Vec<RewardRedemption>,
    activities: Vec<Activity>,
    registrations: Vec<ActivityRegistration>,
}

/// In-process ledger seeded with the fixture users and rewards
pub struct MemoryRewardStore {
    ledger: Mutex<Ledger>,
}

impl MemoryRewardStore {
    pub fn new(rewards: Vec<Reward>, points: impl IntoIterator<Item = (String, i32)>) -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                points: points.into_iter().collect(),
                rewards,
                ..Default::default()
            }),
        }
    }

    pub fn with_activities(self, activities: Vec<Activity>) -> Self {
        self.with_ledger(|ledger| ledger.activities = activities);
        self
    }

    pub fn seeded() -> Self {
        Self::new(
            fixtures::rewards(),
            fixtures::STUDENTS
                .iter()
                .map(|s| (s.user_id.to_string(), fixtures::STARTING_POINTS)),
        )
        .with_activities(fixtures::activities())
    }

    fn with_ledger<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut ledger)
    }
}

#[async_trait]
impl RewardStore for MemoryRewardStore {
    async fn list_rewards(&self) -> AppResult<Vec<Reward>> {
        let mut rewards: Vec<Reward> = self.with_ledger(|ledger| {
            ledger
                .rewards
                .iter()
                .filter(|r| r.available)
                .cloned()
                .collect()
        });
        rewards.sort_by_key(|r| r.points_cost);
        Ok(rewards)
    }

    async fn points_balance(&self, user_id: &str) -> AppResult<PointsBalance> {
        self.with_ledger(|ledger| {
            let total_points = *ledger
                .points
                .get(user_id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

            let earned_points = ledger
                .registrations
                .iter()
                .rev()
                .filter(|r| r.user_id == user_id)
                .filter_map(|r| {
                    let activity = ledger.activities.iter().find(|a| a.id == r.activity_id)?;
                    Some(EarnedPoints {
                        activity: activity.clone(),
                        points_earned: r.points_earned,
                        earned_at: r.earned_at,
                    })
                })
                .collect();

            Ok(PointsBalance {
                user_id: user_id.to_string(),
                total_points,
                earned_points,
            })
        })
    }

    async fn activities(&self) -> AppResult<Vec<Activity>> {
        let mut activities = self.with_ledger(|ledger| ledger.activities.clone());
        activities.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(activities)
    }

    async fn register_activity(
        &self,
        user_id: &str,
        activity_id: &str,
    ) -> AppResult<ActivityRegistration> {
        self.with_ledger(|ledger| {
            if !ledger.points.contains_key(user_id) {
                return Err(AppError::NotFound("User not found".to_string()));
            }
            let activity = ledger
                .activities
                .iter()
                .find(|a| a.id == activity_id)
                .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;
            ensure_open(activity)?;
            if ledger
                .registrations
                .iter()
                .any(|r| r.user_id == user_id && r.activity_id == activity_id)
            {
                return Err(already_registered());
            }

            let registration = ActivityRegistration {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                activity_id: activity_id.to_string(),
                points_earned: 0,
                earned_at: Utc::now(),
            };
            ledger.registrations.push(registration.clone());
            Ok(registration)
        })
    }

    async fn redeem(&self, user_id: &str, reward_id: &str) -> AppResult<RewardRedemption> {
        self.with_ledger(|ledger| {
            let balance = *ledger
                .points
                .get(user_id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let reward = ledger
                .rewards
                .iter()
                .find(|r| r.id == reward_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound("Reward not found".to_string()))?;

            check_redeemable(balance, &reward)?;

            let redemption = RewardRedemption {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                reward_id: reward.id.clone(),
                points_spent: reward.points_cost,
                redeemed_at: Utc::now(),
            };
            ledger.redemptions.push(redemption.clone());
            ledger
                .points
                .insert(user_id.to_string(), balance - reward.points_cost);
            Ok(redemption)
        })
    }

    async fn redemptions(&self, user_id: &str) -> AppResult<Vec<RewardRedemption>> {
        Ok(self.with_ledger(|ledger| {
            ledger
                .redemptions
                .iter()
                .rev()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect()
        }))
    }
}
