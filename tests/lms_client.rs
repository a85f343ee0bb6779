use mockito::{Matcher, Server, ServerGuard};
use portal_backend::adapters::{LmsApi, LmsClient};
use portal_backend::config::LmsSettings;
use portal_backend::error::ErrorKind;

const TOKEN_PATH: &str = "/learn/api/public/v1/oauth2/token";

fn client(server: &ServerGuard) -> LmsClient {
    LmsClient::new(&LmsSettings {
        api_url: server.url(),
        api_key: "key".into(),
        api_secret: "secret".into(),
    })
    .unwrap()
}

async fn mock_token(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
    server
        .mock("POST", TOKEN_PATH)
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "client_credentials".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"tok","token_type":"bearer","expires_in":3600}"#)
        .expect(hits)
        .create_async()
        .await
}

fn course_body(n: usize) -> String {
    format!(
        r#"{{"id":"_c{n}","courseId":"CS10{n}","name":"Course {n}","availability":{{"available":"Yes"}}}}"#
    )
}

#[tokio::test]
async fn test_token_is_reused_between_calls() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server, 1).await;
    let _contents = server
        .mock("GET", "/learn/api/public/v1/courses/_c1/contents")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"results":[{"id":"x1","title":"Week 1"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let lms = client(&server);
    assert_eq!(lms.course_content("_c1").await.unwrap().len(), 1);
    assert_eq!(lms.course_content("_c1").await.unwrap().len(), 1);
    token.assert_async().await;
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server, 2).await;
    let _rejected = server
        .mock("GET", "/learn/api/public/v1/courses/_c1/announcements")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let _accepted = server
        .mock("GET", "/learn/api/public/v1/courses/_c1/announcements")
        .with_status(200)
        .with_body(r#"{"results":[{"id":"a1","title":"Welcome"}]}"#)
        .create_async()
        .await;

    let announcements = client(&server).course_announcements("_c1").await.unwrap();
    assert_eq!(announcements[0].title, "Welcome");
    token.assert_async().await;
}

#[tokio::test]
async fn test_second_rejection_is_upstream_failure() {
    let mut server = Server::new_async().await;
    let token = mock_token(&mut server, 2).await;
    let _rejected = server
        .mock("GET", "/learn/api/public/v1/courses/_c1/contents")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;

    let err = client(&server).course_content("_c1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    token.assert_async().await;
}

#[tokio::test]
async fn test_failed_authentication_is_upstream_failure() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", TOKEN_PATH)
        .with_status(400)
        .create_async()
        .await;

    let err = client(&server).course_content("_c1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_missing_course_is_upstream_failure() {
    let mut server = Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _missing = server
        .mock("GET", "/learn/api/public/v1/courses/_gone/contents")
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server).course_content("_gone").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_course_id_is_a_single_path_segment() {
    let mut server = Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let encoded = server
        .mock("GET", "/learn/api/public/v1/courses/a%2F..%2Fusers%3Fx/contents")
        .with_status(200)
        .with_body(r#"{"results":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let content = client(&server).course_content("a/../users?x").await.unwrap();
    assert!(content.is_empty());
    encoded.assert_async().await;
}

#[tokio::test]
async fn test_dot_segments_are_rejected() {
    let server = Server::new_async().await;
    let err = client(&server).course_content("..").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_courses_tolerate_partial_detail_failures() {
    let mut server = Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;

    let memberships: Vec<String> = (1..=5)
        .map(|n| format!(r#"{{"courseId":"_c{n}","courseRoleId":"Student"}}"#))
        .collect();
    let _memberships = server
        .mock("GET", "/learn/api/public/v1/users/u1/courses")
        .with_status(200)
        .with_body(format!(r#"{{"results":[{}]}}"#, memberships.join(",")))
        .create_async()
        .await;

    let mut details = Vec::new();
    for n in 1..=5 {
        let mock = server.mock("GET", format!("/learn/api/public/v1/courses/_c{n}").as_str());
        let mock = if n <= 3 {
            mock.with_status(200).with_body(course_body(n))
        } else {
            mock.with_status(500)
        };
        details.push(mock.create_async().await);
    }

    let courses = client(&server).user_courses("u1").await.unwrap();
    assert_eq!(courses.len(), 3);
    assert!(courses.iter().all(|c| c.role == "Student" && c.available));
}

#[tokio::test]
async fn test_courses_fail_when_every_detail_fails() {
    let mut server = Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _memberships = server
        .mock("GET", "/learn/api/public/v1/users/u1/courses")
        .with_status(200)
        .with_body(r#"{"results":[{"courseId":"_c1"},{"courseId":"_c2"}]}"#)
        .create_async()
        .await;
    let _details = server
        .mock(
            "GET",
            Matcher::Regex(r"^/learn/api/public/v1/courses/_c\d$".into()),
        )
        .with_status(500)
        .create_async()
        .await;

    let err = client(&server).user_courses("u1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_ungraded_columns_are_skipped() {
    let mut server = Server::new_async().await;
    let _token = mock_token(&mut server, 1).await;
    let _columns = server
        .mock("GET", "/learn/api/public/v2/courses/_c1/gradebook/columns")
        .with_status(200)
        .with_body(
            r#"{"results":[
                {"id":"col1","name":"Midterm","score":{"possible":100}},
                {"id":"col2","name":"Final","score":{"possible":100}}
            ]}"#,
        )
        .create_async()
        .await;
    let _graded = server
        .mock(
            "GET",
            "/learn/api/public/v2/courses/_c1/gradebook/columns/col1/users/u1",
        )
        .with_status(200)
        .with_body(r#"{"score":85,"text":"85"}"#)
        .create_async()
        .await;
    let _ungraded = server
        .mock(
            "GET",
            "/learn/api/public/v2/courses/_c1/gradebook/columns/col2/users/u1",
        )
        .with_status(404)
        .create_async()
        .await;

    let summary = client(&server).user_grades("_c1", "u1").await.unwrap();
    assert_eq!(summary.grades.len(), 1);
    assert_eq!(summary.grades[0].column_name, "Midterm");
    assert_eq!(summary.overall_percentage, "85.00");
}
