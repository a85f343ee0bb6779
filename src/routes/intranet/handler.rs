use axum::extract::{Extension, Json, Query, State};
use chrono::{Datelike, Local};
use serde::Deserialize;

use crate::{
    AppState,
    adapters::refresh_student,
    auth::Claims,
    error::AppResult,
    models::{
        Announcement, AttendanceRecord, ScheduleEntry, StudentProfile, WeeklySchedule,
        classes_on, group_by_day,
    },
    result::ApiResult,
    utils::success_to_api_response,
};

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub semester: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementsQuery {
    pub category: Option<String>,
}

pub async fn profile(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<StudentProfile>>> {
    let profile = state.intranet.student_profile(&claims.student_id).await?;
    Ok(success_to_api_response(profile))
}

pub async fn schedule(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<ApiResult<Vec<ScheduleEntry>>>> {
    let schedule = state
        .intranet
        .student_schedule(&claims.student_id, query.semester.as_deref())
        .await?;
    Ok(success_to_api_response(schedule))
}

/// Current-semester classes keyed by Monday-based day index
pub async fn weekly_schedule(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<WeeklySchedule>>> {
    let schedule = state
        .intranet
        .student_schedule(&claims.student_id, None)
        .await?;
    Ok(success_to_api_response(group_by_day(schedule)))
}

pub async fn today_schedule(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<ScheduleEntry>>>> {
    let schedule = state
        .intranet
        .student_schedule(&claims.student_id, None)
        .await?;
    let today = Local::now().weekday();
    Ok(success_to_api_response(classes_on(schedule, today)))
}

pub async fn attendance(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<AttendanceRecord>>>> {
    let attendance = state
        .intranet
        .student_attendance(&claims.student_id)
        .await?;
    Ok(success_to_api_response(attendance))
}

pub async fn announcements(
    State(state): State<AppState>,
    Query(query): Query<AnnouncementsQuery>,
) -> AppResult<Json<ApiResult<Vec<Announcement>>>> {
    let announcements = state
        .intranet
        .campus_announcements(query.category.as_deref())
        .await?;
    Ok(success_to_api_response(announcements))
}

/// Drops the caller's cached intranet records and returns the refetched profile
pub async fn refresh(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<StudentProfile>>> {
    let profile =
        refresh_student(state.intranet.as_ref(), &state.cache, &claims.student_id).await?;
    Ok(success_to_api_response(profile))
}
