use mockito::{Matcher, Server, ServerGuard};
use portal_backend::adapters::{IntranetApi, IntranetClient};
use portal_backend::config::IntranetSettings;
use portal_backend::error::ErrorKind;

fn client(server: &ServerGuard) -> IntranetClient {
    IntranetClient::new(&IntranetSettings {
        api_url: server.url(),
        api_key: "intranet-key".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_profile_request_carries_api_key() {
    let mut server = Server::new_async().await;
    let profile = server
        .mock("GET", "/api/students/STU2024001")
        .match_header("x-api-key", "intranet-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "studentId": "STU2024001",
                "firstName": "John",
                "lastName": "Doe",
                "email": "john.doe@aivancity.edu",
                "program": "Computer Science",
                "year": 3
            }"#,
        )
        .create_async()
        .await;

    let student = client(&server).student_profile("STU2024001").await.unwrap();
    assert_eq!(student.first_name, "John");
    assert_eq!(student.gpa, None);
    profile.assert_async().await;
}

#[tokio::test]
async fn test_schedule_forwards_semester() {
    let mut server = Server::new_async().await;
    let _schedule = server
        .mock("GET", "/api/students/STU2024001/schedule")
        .match_query(Matcher::UrlEncoded("semester".into(), "2024-fall".into()))
        .with_status(200)
        .with_body(
            r#"{"schedule":[{
                "courseCode": "CS301",
                "courseName": "Data Structures",
                "dayOfWeek": 0,
                "startTime": "09:00",
                "endTime": "10:30",
                "room": "A101",
                "building": "Main",
                "professor": "Dr. Smith",
                "type": "seminar"
            }]}"#,
        )
        .create_async()
        .await;

    let schedule = client(&server)
        .student_schedule("STU2024001", Some("2024-fall"))
        .await
        .unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].course_code, "CS301");
}

#[tokio::test]
async fn test_server_error_is_upstream_failure() {
    let mut server = Server::new_async().await;
    let _attendance = server
        .mock("GET", "/api/students/STU2024001/attendance")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = client(&server)
        .student_attendance("STU2024001")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_missing_student_is_upstream_failure() {
    let mut server = Server::new_async().await;
    let _profile = server
        .mock("GET", "/api/students/nobody")
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server).student_profile("nobody").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_announcements_unwrap_the_list() {
    let mut server = Server::new_async().await;
    let _announcements = server
        .mock("GET", "/api/announcements")
        .with_status(200)
        .with_body(r#"{"announcements":[]}"#)
        .create_async()
        .await;

    let announcements = client(&server).campus_announcements(None).await.unwrap();
    assert!(announcements.is_empty());
}
