use axum::extract::{Extension, Json, Path, State};

use crate::{
    AppState,
    auth::Claims,
    error::AppResult,
    models::{Activity, ActivityRegistration, PointsBalance, Reward, RewardRedemption},
    result::ApiResult,
    utils::success_to_api_response,
};

pub async fn list_rewards(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<Reward>>>> {
    let rewards = state.rewards.list_rewards().await?;
    Ok(success_to_api_response(rewards))
}

pub async fn points(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<PointsBalance>>> {
    let balance = state.rewards.points_balance(&claims.sub).await?;
    Ok(success_to_api_response(balance))
}

pub async fn redeem(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(reward_id): Path<String>,
) -> AppResult<Json<ApiResult<RewardRedemption>>> {
    let redemption = state.rewards.redeem(&claims.sub, &reward_id).await?;
    tracing::info!(
        "User {} redeemed {} for {} points",
        claims.sub,
        reward_id,
        redemption.points_spent
    );
    Ok(success_to_api_response(redemption))
}

pub async fn redemptions(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<RewardRedemption>>>> {
    let redemptions = state.rewards.redemptions(&claims.sub).await?;
    Ok(success_to_api_response(redemptions))
}

pub async fn activities(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<Activity>>>> {
    let activities = state.rewards.activities().await?;
    Ok(success_to_api_response(activities))
}

pub async fn register_activity(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> AppResult<Json<ApiResult<ActivityRegistration>>> {
    let registration = state
        .rewards
        .register_activity(&claims.sub, &activity_id)
        .await?;
    tracing::info!("User {} registered for activity {}", claims.sub, activity_id);
    Ok(success_to_api_response(registration))
}
