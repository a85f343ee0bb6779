use axum::extract::{Extension, Json, Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    auth::Claims,
    chat::NewSession,
    error::{AppError, AppResult},
    models::{ChatMessage, ChatSession, SessionPreview},
    result::ApiResult,
    utils::success_to_api_response,
};

use super::model::{CreateSessionRequest, SendMessageRequest};

/// Resolves the session and hides it from anyone but its owner
async fn owned_session(state: &AppState, claims: &Claims, raw_id: &str) -> AppResult<ChatSession> {
    let not_found = || AppError::NotFound("Session not found".to_string());
    let session_id = Uuid::parse_str(raw_id).map_err(|_| not_found())?;
    let session = state.chat.session(session_id).await?;
    if session.user_id != claims.sub {
        return Err(not_found());
    }
    Ok(session)
}

pub async fn create_session(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<Json<ApiResult<NewSession>>> {
    let created = state.chat.create_session(&claims.sub, &req.bot_type).await?;
    Ok(success_to_api_response(created))
}

pub async fn list_sessions(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResult<Vec<SessionPreview>>>> {
    let sessions = state.chat.get_user_sessions(&claims.sub).await?;
    Ok(success_to_api_response(sessions))
}

pub async fn send_message(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResult<ChatMessage>>> {
    let session = owned_session(&state, &claims, &session_id).await?;
    let reply = state.chat.chat(session.id, &req.message).await?;
    Ok(success_to_api_response(reply))
}

pub async fn history(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<ApiResult<Vec<ChatMessage>>>> {
    let session = owned_session(&state, &claims, &session_id).await?;
    let messages = state.chat.get_chat_history(session.id).await?;
    Ok(success_to_api_response(messages))
}
