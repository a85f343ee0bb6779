// Chat persistence
// Sessions and their ordered messages, in Postgres or in process memory

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{BotType, ChatMessage, ChatRole, ChatSession, SessionPreview};

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Inserts the session and its opening assistant message as one unit;
    /// either both are stored or neither is
    async fn create_session_with_welcome(
        &self,
        user_id: &str,
        bot: BotType,
        welcome: &str,
    ) -> AppResult<(ChatSession, ChatMessage)>;

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<ChatSession>>;

    async fn append_message(
        &self,
        session_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> AppResult<ChatMessage>;

    /// The last `limit` messages, oldest first
    async fn recent_messages(&self, session_id: Uuid, limit: usize) -> AppResult<Vec<ChatMessage>>;

    /// Every message in creation order
    async fn messages(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>>;

    /// Sessions of the user, newest first, each with its latest message
    async fn user_sessions(&self, user_id: &str) -> AppResult<Vec<SessionPreview>>;
}

/// Row shape of `chat_sessions`
#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: String,
    bot_type: String,
    started_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for ChatSession {
    type Error = crate::error::AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(ChatSession {
            id: row.id,
            user_id: row.user_id,
            bot_type: row.bot_type.parse()?,
            started_at: row.started_at,
        })
    }
}

#[derive(FromRow)]
struct MessageRow {
    id: Uuid,
    session_id: Uuid,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = crate::error::AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(ChatMessage {
            id: row.id,
            session_id: row.session_id,
            role: row.role.parse()?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}

/// A session joined with its latest message, if any
#[derive(FromRow)]
struct PreviewRow {
    id: Uuid,
    user_id: String,
    bot_type: String,
    started_at: DateTime<Utc>,
    message_id: Option<Uuid>,
    message_role: Option<String>,
    message_content: Option<String>,
    message_created_at: Option<DateTime<Utc>>,
}

impl TryFrom<PreviewRow> for SessionPreview {
    type Error = crate::error::AppError;

    fn try_from(row: PreviewRow) -> Result<Self, Self::Error> {
        let last_message = match (
            row.message_id,
            row.message_role,
            row.message_content,
            row.message_created_at,
        ) {
            (Some(id), Some(role), Some(content), Some(created_at)) => Some(ChatMessage {
                id,
                session_id: row.id,
                role: role.parse()?,
                content,
                created_at,
            }),
            _ => None,
        };

        Ok(SessionPreview {
            session: ChatSession {
                id: row.id,
                user_id: row.user_id,
                bot_type: row.bot_type.parse()?,
                started_at: row.started_at,
            },
            last_message,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = crate::error::AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

pub struct PgChatStore {
    db: Arc<PgPool>,
}

impl PgChatStore {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn create_session_with_welcome(
        &self,
        user_id: &str,
        bot: BotType,
        welcome: &str,
    ) -> AppResult<(ChatSession, ChatMessage)> {
        let mut tx = self.db.begin().await?;

        let session = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO chat_sessions (id, user_id, bot_type, started_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, bot_type, started_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(bot.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let message = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, clock_timestamp())
            RETURNING id, session_id, role, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session.id)
        .bind(ChatRole::Assistant.as_str())
        .bind(welcome)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((session.try_into()?, message.try_into()?))
    }

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<ChatSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, bot_type, started_at FROM chat_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&*self.db)
        .await?;

        row.map(ChatSession::try_from).transpose()
    }

    async fn append_message(
        &self,
        session_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, clock_timestamp())
            RETURNING id, session_id, role, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .fetch_one(&*self.db)
        .await?;

        row.try_into()
    }

    async fn recent_messages(&self, session_id: Uuid, limit: usize) -> AppResult<Vec<ChatMessage>> {
        let mut rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(&*self.db)
        .await?;

        rows.reverse();
        convert_all(rows)
    }

    async fn messages(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&*self.db)
        .await?;

        convert_all(rows)
    }

    async fn user_sessions(&self, user_id: &str) -> AppResult<Vec<SessionPreview>> {
        let rows = sqlx::query_as::<_, PreviewRow>(
            r#"
            SELECT s.id, s.user_id, s.bot_type, s.started_at,
                   m.id AS message_id,
                   m.role AS message_role,
                   m.content AS message_content,
                   m.created_at AS message_created_at
            FROM chat_sessions s
            LEFT JOIN LATERAL (
                SELECT id, role, content, created_at
                FROM chat_messages
                WHERE session_id = s.id
                ORDER BY created_at DESC, seq DESC
                LIMIT 1
            ) m ON TRUE
            WHERE s.user_id = $1
            ORDER BY s.started_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        convert_all(rows)
    }
}

#[derive(Default)]
struct ChatLog {
    sessions: Vec<ChatSession>,
    messages: Vec<ChatMessage>,
}

/// In-process store used when no database is configured
#[derive(Default)]
pub struct MemoryChatStore {
    log: Mutex<ChatLog>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut ChatLog) -> T) -> T {
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut log)
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn create_session_with_welcome(
        &self,
        user_id: &str,
        bot: BotType,
        welcome: &str,
    ) -> AppResult<(ChatSession, ChatMessage)> {
        let session = ChatSession {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            bot_type: bot,
            started_at: Utc::now(),
        };
        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id: session.id,
            role: ChatRole::Assistant,
            content: welcome.to_string(),
            created_at: session.started_at,
        };
        self.with_log(|log| {
            log.sessions.push(session.clone());
            log.messages.push(message.clone());
        });
        Ok((session, message))
    }

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<ChatSession>> {
        Ok(self.with_log(|log| log.sessions.iter().find(|s| s.id == session_id).cloned()))
    }

    async fn append_message(
        &self,
        session_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            session_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.with_log(|log| log.messages.push(message.clone()));
        Ok(message)
    }

    async fn recent_messages(&self, session_id: Uuid, limit: usize) -> AppResult<Vec<ChatMessage>> {
        let mut recent: Vec<ChatMessage> = self.with_log(|log| {
            log.messages
                .iter()
                .rev()
                .filter(|m| m.session_id == session_id)
                .take(limit)
                .cloned()
                .collect()
        });
        recent.reverse();
        Ok(recent)
    }

    async fn messages(&self, session_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        Ok(self.with_log(|log| {
            log.messages
                .iter()
                .filter(|m| m.session_id == session_id)
                .cloned()
                .collect()
        }))
    }

    async fn user_sessions(&self, user_id: &str) -> AppResult<Vec<SessionPreview>> {
        Ok(self.with_log(|log| {
            log.sessions
                .iter()
                .rev()
                .filter(|s| s.user_id == user_id)
                .map(|session| SessionPreview {
                    session: session.clone(),
                    last_message: log
                        .messages
                        .iter()
                        .rev()
                        .find(|m| m.session_id == session.id)
                        .cloned(),
                })
                .collect()
        }))
    }
}
