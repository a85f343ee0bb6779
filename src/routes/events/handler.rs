use axum::extract::{Extension, Json, Path, State};

use crate::{
    AppState,
    auth::Claims,
    error::AppResult,
    models::{CampusEvent, EventDetails, EventRegistration, UserEventRegistration},
    result::ApiResult,
    utils::success_to_api_response,
};

pub async fn list_events(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<CampusEvent>>>> {
    let events = state.events.upcoming().await?;
    Ok(success_to_api_response(events))
}

pub async fn details(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<Json<ApiResult<EventDetails>>> {
    let event = state.events.details(&event_id).await?;
    Ok(success_to_api_response(event))
}

pub async fn register(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<Json<ApiResult<EventRegistration>>> {
    let registration = state.events.register(&event_id, &claims.sub).await?;
    Ok(success_to_api_response(registration))
}

pub async fn my_registrations(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<UserEventRegistration>>>> {
    let registrations = state.events.registrations(&claims.sub).await?;
    Ok(success_to_api_response(registrations))
}
