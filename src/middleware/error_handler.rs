use axum::{
    body::{Body, to_bytes},
    http::{Request, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};

/// Bytes of a failed response body that get logged
const LOGGED_BODY_LIMIT: usize = 4096;

/// Logs the head of every 5xx response body, then passes the whole body on unchanged
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("{} {} failed with {}; body unreadable: {}", method, path, parts.status, e);
            parts.headers.remove(CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    tracing::error!(
        "{} {} failed with {}: {}",
        method,
        path,
        parts.status,
        String::from_utf8_lossy(&bytes[..bytes.len().min(LOGGED_BODY_LIMIT)])
    );

    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_large_error_body_is_forwarded_whole() {
        let payload = "x".repeat(LOGGED_BODY_LIMIT * 3);
        let served = payload.clone();
        let app = Router::new()
            .route(
                "/boom",
                get(move || {
                    let body = served.clone();
                    async move { (StatusCode::INTERNAL_SERVER_ERROR, body) }
                }),
            )
            .layer(middleware::from_fn(log_errors));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.len(), payload.len());
    }
}
