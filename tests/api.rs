use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use portal_backend::{AppState, config::Config, middleware::RateLimiter, router::create_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::for_mock();
    let limiter = Arc::new(RateLimiter::new(None, &config));
    create_router(AppState::in_memory(config).unwrap(), limiter)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, student_id: &str) -> Value {
    let (status, body) = call(
        app,
        "POST",
        "/api/v1/auth/mock-login",
        None,
        Some(json!({ "studentId": student_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["content"].clone()
}

fn access_token(login: &Value) -> String {
    login["tokens"]["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = app();
    let (status, body) = call(&app, "GET", "/api/v1/intranet/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
    assert!(body["error_message"].is_string());
}

#[tokio::test]
async fn test_mock_login_then_profile() {
    let app = app();
    let session = login(&app, "STU2024002").await;
    assert_eq!(session["user"]["userId"], "user-002");

    let token = access_token(&session);
    let (status, body) = call(&app, "GET", "/api/v1/intranet/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["content"]["firstName"], "Jane");
}

#[tokio::test]
async fn test_unknown_mock_student_is_not_found() {
    let app = app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/mock-login",
        None,
        Some(json!({ "studentId": "STU0000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_refresh_rotates_and_logout_revokes() {
    let app = app();
    let session = login(&app, "STU2024001").await;
    let refresh = session["tokens"]["refreshToken"].clone();

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["content"].clone();

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refreshToken": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = rotated["accessToken"].as_str().unwrap();
    let (status, _) = call(&app, "POST", "/api/v1/auth/logout", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refreshToken": rotated["refreshToken"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_course_grades_summary() {
    let app = app();
    let token = access_token(&login(&app, "STU2024001").await);

    let (status, body) = call(&app, "GET", "/api/v1/lms/courses", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["content"].as_array().unwrap().is_empty());

    let (status, body) = call(
        &app,
        "GET",
        "/api/v1/lms/courses/course-001/grades",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["userId"], "user-001");
    assert!(body["content"]["overallPercentage"].is_string());
}

#[tokio::test]
async fn test_chat_session_is_private_to_its_owner() {
    let app = app();
    let owner = access_token(&login(&app, "STU2024001").await);
    let other = access_token(&login(&app, "STU2024002").await);

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/chat/sessions",
        Some(&owner),
        Some(json!({ "botType": "study" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["content"]["session"]["id"].as_str().unwrap().to_string();
    let messages_uri = format!("/api/v1/chat/sessions/{}/messages", session_id);

    let (status, body) = call(
        &app,
        "POST",
        &messages_uri,
        Some(&owner),
        Some(json!({ "message": "How should I study for my exam?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["role"], "assistant");

    let (status, body) = call(&app, "GET", &messages_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 3);

    let (status, _) = call(&app, "GET", &messages_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_bot_type_is_rejected() {
    let app = app();
    let token = access_token(&login(&app, "STU2024001").await);
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/chat/sessions",
        Some(&token),
        Some(json!({ "botType": "pirate" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
}

#[tokio::test]
async fn test_redeem_deducts_points() {
    let app = app();
    let token = access_token(&login(&app, "STU2024003").await);

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/rewards/reward-002/redeem",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["pointsSpent"], 100);

    let (_, body) = call(&app, "GET", "/api/v1/rewards/points", Some(&token), None).await;
    assert_eq!(body["content"]["totalPoints"], 50);

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/rewards/reward-002/redeem",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error_message"]
            .as_str()
            .unwrap()
            .contains("Insufficient AI Points")
    );

    let (_, body) = call(&app, "GET", "/api/v1/rewards/redemptions", Some(&token), None).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_room_booking_conflict_is_409() {
    let app = app();
    let first = access_token(&login(&app, "STU2024001").await);
    let second = access_token(&login(&app, "STU2024002").await);
    let slot = json!({
        "roomName": "Study Room A",
        "bookingDate": "2030-05-14",
        "startTime": "10:00",
        "endTime": "12:00"
    });

    let (status, body) = call(&app, "POST", "/api/v1/tools/room-booking", Some(&first), Some(slot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["status"], "confirmed");
    assert_eq!(body["content"]["startTime"], "10:00");

    let overlapping = json!({
        "roomName": "Study Room A",
        "bookingDate": "2030-05-14",
        "startTime": "11:30",
        "endTime": "13:00"
    });
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/tools/room-booking",
        Some(&second),
        Some(overlapping),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1009);

    let (_, body) = call(&app, "GET", "/api/v1/tools/room-booking", Some(&first), None).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 1);
    let (_, body) = call(&app, "GET", "/api/v1/tools/room-booking", Some(&second), None).await;
    assert!(body["content"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_print_job_is_priced() {
    let app = app();
    let token = access_token(&login(&app, "STU2024001").await);
    let job = json!({
        "fileName": "notes.pdf",
        "location": "Library L1",
        "copies": 3,
        "pages": 5,
        "color": false,
        "duplex": true
    });

    let (status, body) = call(&app, "POST", "/api/v1/tools/print-jobs", Some(&token), Some(job)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["costCents"], 40);

    let (_, body) = call(&app, "GET", "/api/v1/tools/print-jobs", Some(&token), None).await;
    assert_eq!(body["content"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_activity_registration_appears_in_points() {
    let app = app();
    let token = access_token(&login(&app, "STU2024001").await);

    let (status, body) = call(&app, "GET", "/api/v1/rewards/activities", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 3);

    let uri = "/api/v1/rewards/activities/activity-001/register";
    let (status, _) = call(&app, "POST", uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, "POST", uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (_, body) = call(&app, "GET", "/api/v1/rewards/points", Some(&token), None).await;
    let earned = body["content"]["earnedPoints"].as_array().unwrap();
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0]["activity"]["id"], "activity-001");
    assert_eq!(earned[0]["pointsEarned"], 0);
}

#[tokio::test]
async fn test_event_registration_flow() {
    let app = app();
    let token = access_token(&login(&app, "STU2024002").await);

    let (status, body) = call(&app, "GET", "/api/v1/events", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"][0]["id"], "event-004");

    let uri = "/api/v1/events/event-004/register";
    let (status, _) = call(&app, "POST", uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "POST", uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = call(&app, "GET", "/api/v1/events/my/registrations", Some(&token), None).await;
    let mine = body["content"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["event"]["name"], "Wellness Workshop: Stress Management");

    let (status, body) = call(&app, "GET", "/api/v1/events/event-004", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["registrations"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "GET", "/api/v1/events/event-999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
