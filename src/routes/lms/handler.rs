use axum::extract::{Extension, Json, Path, State};

use crate::{
    AppState,
    adapters::invalidate_course,
    auth::Claims,
    error::AppResult,
    models::{Assignment, Course, CourseAnnouncement, CourseContent, GradeSummary},
    result::ApiResult,
    utils::success_to_api_response,
};

pub async fn courses(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<Course>>>> {
    let courses = state.lms.user_courses(&claims.sub).await?;
    Ok(success_to_api_response(courses))
}

pub async fn content(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<ApiResult<Vec<CourseContent>>>> {
    let content = state.lms.course_content(&course_id).await?;
    Ok(success_to_api_response(content))
}

pub async fn assignments(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<ApiResult<Vec<Assignment>>>> {
    let assignments = state.lms.course_assignments(&course_id).await?;
    Ok(success_to_api_response(assignments))
}

pub async fn grades(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<ApiResult<GradeSummary>>> {
    let grades = state.lms.user_grades(&course_id, &claims.sub).await?;
    Ok(success_to_api_response(grades))
}

pub async fn announcements(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<ApiResult<Vec<CourseAnnouncement>>>> {
    let announcements = state.lms.course_announcements(&course_id).await?;
    Ok(success_to_api_response(announcements))
}

pub async fn refresh_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Json<ApiResult<String>> {
    invalidate_course(&state.cache, &course_id).await;
    success_to_api_response(course_id)
}
