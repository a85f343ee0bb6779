// Chat session manager
// Per-user conversations with a fixed set of persona bots

pub mod personas;
pub mod responder;
pub mod store;

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{BotType, ChatMessage, ChatRole, ChatSession, SessionPreview};

pub use responder::{CompletionResponder, MockResponder, Responder};
pub use store::{ChatStore, MemoryChatStore, PgChatStore};

/// Messages handed to the responder as conversation context
pub const CONTEXT_WINDOW: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub session: ChatSession,
    pub welcome_message: ChatMessage,
}

#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    responder: Arc<dyn Responder>,
}

impl ChatService {
    pub fn new(store: Arc<dyn ChatStore>, responder: Arc<dyn Responder>) -> Self {
        Self { store, responder }
    }

    /// Picks the mock or completion responder from the mock-mode flag
    pub fn responder_for(config: &Config) -> AppResult<Arc<dyn Responder>> {
        if config.mock.enabled {
            return Ok(Arc::new(MockResponder::new(config.mock.delay_ms)));
        }
        Ok(Arc::new(CompletionResponder::new(&config.completion)?))
    }

    pub async fn create_session(&self, user_id: &str, bot_type: &str) -> AppResult<NewSession> {
        let bot: BotType = bot_type.parse()?;

        let (session, welcome_message) = self
            .store
            .create_session_with_welcome(user_id, bot, personas::welcome_message(bot))
            .await?;
        tracing::info!("Chat session {} started with {} bot", session.id, bot);

        Ok(NewSession {
            session,
            welcome_message,
        })
    }

    /// Unknown session ids are NotFound
    pub async fn session(&self, session_id: Uuid) -> AppResult<ChatSession> {
        self.store
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }

    /// Stores the user message, generates the assistant reply and returns it
    pub async fn chat(&self, session_id: Uuid, user_message: &str) -> AppResult<ChatMessage> {
        let session = self.session(session_id).await?;

        let user_message = user_message.trim();
        if user_message.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let history = self.store.recent_messages(session_id, CONTEXT_WINDOW).await?;
        self.store
            .append_message(session_id, ChatRole::User, user_message)
            .await?;

        let reply = self
            .responder
            .reply(session.bot_type, &history, user_message)
            .await?;

        self.store
            .append_message(session_id, ChatRole::Assistant, &reply)
            .await
    }

    pub async fn get_chat_history(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        self.session(session_id).await?;
        self.store.messages(session_id).await
    }

    pub async fn get_user_sessions(&self, user_id: &str) -> AppResult<Vec<SessionPreview>> {
        self.store.user_sessions(user_id).await
    }
}
