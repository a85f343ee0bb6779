use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Chat assistant personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotType {
    Campus,
    Email,
    Wellness,
    Interview,
    Study,
    Career,
}

impl BotType {
    pub const ALL: [BotType; 6] = [
        BotType::Campus,
        BotType::Email,
        BotType::Wellness,
        BotType::Interview,
        BotType::Study,
        BotType::Career,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BotType::Campus => "campus",
            BotType::Email => "email",
            BotType::Wellness => "wellness",
            BotType::Interview => "interview",
            BotType::Study => "study",
            BotType::Career => "career",
        }
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BotType::ALL
            .into_iter()
            .find(|bot| bot.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Invalid bot type: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl FromStr for ChatRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(AppError::Internal(format!("unknown chat role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: String,
    pub bot_type: BotType,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A session together with its most recent message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPreview {
    #[serde(flatten)]
    pub session: ChatSession,
    pub last_message: Option<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_every_bot_type() {
        for bot in BotType::ALL {
            assert_eq!(bot.as_str().parse::<BotType>().unwrap(), bot);
        }
    }

    #[test]
    fn test_unknown_bot_type_is_validation_error() {
        let err = "astrology".parse::<BotType>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Matching is exact
        assert!("Campus".parse::<BotType>().is_err());
    }
}
