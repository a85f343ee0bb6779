use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    auth::{Claims, Identity, TokenPair},
    error::{AppError, AppResult},
    mock::fixtures,
    result::ApiResult,
    utils::success_to_api_response,
};

use super::model::{
    AuthStatusResponse, LoginResponse, MessageResponse, MockLoginRequest, RefreshTokenRequest,
};

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> AppResult<Json<ApiResult<TokenPair>>> {
    let refresh_token = req
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Refresh token is required".to_string()))?;

    let tokens = state.tokens.refresh(&refresh_token).await?;
    Ok(success_to_api_response(tokens))
}

/// Signs in as a fixture student; only routed in mock mode
pub async fn mock_login(
    State(state): State<AppState>,
    Json(req): Json<MockLoginRequest>,
) -> AppResult<Json<ApiResult<LoginResponse>>> {
    let student = match req.student_id.as_deref() {
        Some(student_id) => fixtures::find_student(student_id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown student {}", student_id)))?,
        None => &fixtures::STUDENTS[0],
    };

    let user = Identity {
        user_id: student.user_id.to_string(),
        student_id: student.student_id.to_string(),
        email: student.email.to_string(),
        role: "student".to_string(),
    };
    let tokens = state.tokens.issue(&user).await?;
    tracing::info!("[MOCK] Signed in as {}", user.student_id);

    Ok(success_to_api_response(LoginResponse { user, tokens }))
}

pub async fn logout(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Json<ApiResult<MessageResponse>> {
    state.tokens.revoke(&claims.sub).await;
    success_to_api_response(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

pub async fn status(Extension(claims): Extension<Claims>) -> Json<ApiResult<AuthStatusResponse>> {
    success_to_api_response(AuthStatusResponse {
        authenticated: true,
        user: claims.identity(),
    })
}
