//! Reply generation: canned mock replies or a chat-completions API

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::personas;
use crate::adapters::UPSTREAM_TIMEOUT;
use crate::config::CompletionSettings;
use crate::error::{AppError, AppResult};
use crate::mock::simulate_delay;
use crate::models::{BotType, ChatMessage};

/// Extra latency of mock replies on top of the configured mock delay
const MOCK_REPLY_EXTRA_DELAY_MS: u64 = 500;

const TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait Responder: Send + Sync {
    /// `history` holds earlier messages of the session, oldest first
    async fn reply(&self, bot: BotType, history: &[ChatMessage], message: &str)
    -> AppResult<String>;
}

/// Which canned reply a keyword rule resolves to
#[derive(Debug, Clone, Copy)]
enum Pick {
    /// Entry of the session persona's own pool
    Own(usize),
    /// Fixed entry of another persona's pool, whatever the session persona
    Persona(BotType, usize),
}

struct Rule {
    keywords: &'static [&'static str],
    pick: Pick,
}

// Checked in order against the lower-cased message; the first match wins.
// The cross-persona picks mean e.g. a campus session asked about stress answers
// with the wellness counseling reply.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["library", "book"],
        pick: Pick::Own(0),
    },
    Rule {
        keywords: &["building", "room", "where"],
        pick: Pick::Own(1),
    },
    Rule {
        keywords: &["stress", "anxious", "overwhelmed"],
        pick: Pick::Persona(BotType::Wellness, 3),
    },
    Rule {
        keywords: &["email", "write", "professor"],
        pick: Pick::Persona(BotType::Email, 0),
    },
    Rule {
        keywords: &["interview", "star"],
        pick: Pick::Persona(BotType::Interview, 0),
    },
    Rule {
        keywords: &["study", "learn", "exam"],
        pick: Pick::Persona(BotType::Study, 0),
    },
];

/// Keyword-matched reply, or `None` when no rule applies
pub fn rule_reply(bot: BotType, message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    let rule = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))?;

    let (pool, index) = match rule.pick {
        Pick::Own(index) => (personas::reply_pool(bot), index),
        Pick::Persona(other, index) => (personas::reply_pool(other), index),
    };
    pool.get(index).copied()
}

/// Canned replies with simulated latency
pub struct MockResponder {
    delay_ms: u64,
}

impl MockResponder {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn reply(
        &self,
        bot: BotType,
        _history: &[ChatMessage],
        message: &str,
    ) -> AppResult<String> {
        let preview: String = message.chars().take(50).collect();
        tracing::info!("[MOCK] AI Chat - Bot: {}, Message: {}...", bot, preview);

        simulate_delay(self.delay_ms + MOCK_REPLY_EXTRA_DELAY_MS).await;

        let reply = rule_reply(bot, message).or_else(|| {
            personas::reply_pool(bot)
                .choose(&mut rand::thread_rng())
                .copied()
        });
        Ok(reply.unwrap_or(personas::APOLOGY).to_string())
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionContent>,
}

#[derive(Deserialize)]
struct CompletionContent {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
pub struct CompletionResponder {
    http: HttpClient,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl CompletionResponder {
    pub fn new(settings: &CompletionSettings) -> AppResult<Self> {
        let http = HttpClient::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

#[async_trait]
impl Responder for CompletionResponder {
    async fn reply(
        &self,
        bot: BotType,
        history: &[ChatMessage],
        message: &str,
    ) -> AppResult<String> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(CompletionMessage {
            role: "system",
            content: personas::system_prompt(bot),
        });
        messages.extend(history.iter().map(|m| CompletionMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));
        messages.push(CompletionMessage {
            role: "user",
            content: message,
        });

        let request = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                AppError::upstream("AI completion request failed")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Completion API error: {} - {}", status, body);
            return Err(AppError::upstream(format!("AI completion API returned {}", status)));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Completion response parse failed: {}", e);
            AppError::upstream("AI completion API returned an invalid body")
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty());

        Ok(content.unwrap_or_else(|| personas::APOLOGY.to_string()))
    }
}
