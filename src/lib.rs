use std::sync::Arc;

use sqlx::PgPool;

use adapters::{Adapters, IntranetApi, LmsApi};
use auth::TokenService;
use cache::Cache;
use chat::{ChatService, ChatStore, MemoryChatStore, PgChatStore};
use config::Config;
use error::AppResult;
use events::{EventService, EventStore, MemoryEventStore, PgEventStore};
use rewards::{MemoryRewardStore, PgRewardStore, RewardStore};
use tools::{MemoryToolsStore, PgToolsStore, ToolsService, ToolsStore};

pub mod adapters;
pub mod auth;
pub mod cache;
pub mod chat;
pub mod config;
pub mod error;
pub mod events;
pub mod middleware;
pub mod mock;
pub mod models;
pub mod result;
pub mod rewards;
pub mod router;
pub mod routes;
pub mod tools;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: Cache,
    pub intranet: Arc<dyn IntranetApi>,
    pub lms: Arc<dyn LmsApi>,
    pub chat: ChatService,
    pub tokens: TokenService,
    pub rewards: Arc<dyn RewardStore>,
    pub events: EventService,
    pub tools: ToolsService,
}

/// The database-backed services, or their in-memory stand-ins
struct Stores {
    chat: Arc<dyn ChatStore>,
    rewards: Arc<dyn RewardStore>,
    events: Arc<dyn EventStore>,
    tools: Arc<dyn ToolsStore>,
}

impl Stores {
    fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            chat: Arc::new(PgChatStore::new(pool.clone())),
            rewards: Arc::new(PgRewardStore::new(pool.clone())),
            events: Arc::new(PgEventStore::new(pool.clone())),
            tools: Arc::new(PgToolsStore::new(pool)),
        }
    }

    fn in_memory() -> Self {
        Self {
            chat: Arc::new(MemoryChatStore::new()),
            rewards: Arc::new(MemoryRewardStore::seeded()),
            events: Arc::new(MemoryEventStore::seeded()),
            tools: Arc::new(MemoryToolsStore::new()),
        }
    }
}

impl AppState {
    /// Wires adapters and services; chat, rewards, events and tools live in
    /// Postgres when a pool is given
    pub fn build(config: Config, cache: Cache, pool: Option<Arc<PgPool>>) -> AppResult<Self> {
        let adapters = Adapters::build(&config, &cache)?;

        let stores = match pool {
            Some(pool) => Stores::postgres(pool),
            None => {
                tracing::warn!("No database configured, persistent data is kept in memory");
                Stores::in_memory()
            }
        };
        let chat = ChatService::new(stores.chat, ChatService::responder_for(&config)?);
        let tokens = TokenService::new(&config, cache.clone());
        let events = EventService::new(stores.events, cache.clone());
        let tools = ToolsService::new(stores.tools);

        Ok(Self {
            config,
            cache,
            intranet: adapters.intranet,
            lms: adapters.lms,
            chat,
            tokens,
            rewards: stores.rewards,
            events,
            tools,
        })
    }

    /// Fully in-process state: in-memory cache and stores
    pub fn in_memory(config: Config) -> AppResult<Self> {
        Self::build(config, Cache::in_memory(), None)
    }
}
