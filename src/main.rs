use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use portal_backend::{
    AppState,
    cache::{Cache, RedisStore},
    config::Config,
    middleware::RateLimiter,
    router::create_router,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    if config.mock.enabled {
        tracing::info!(
            "[MOCK] Mock mode enabled (delay {}ms, failure rate {})",
            config.mock.delay_ms,
            config.mock.failure_rate
        );
    }

    let pool = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'portal_backend';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await
                .expect("Failed to connect to Postgres");
            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run migrations");
            Some(Arc::new(pool))
        }
        None => None,
    };

    let redis_client = config.redis_url.as_deref().and_then(|url| {
        redis::Client::open(url)
            .inspect_err(|e| tracing::warn!("Invalid Redis URL, using in-process cache: {}", e))
            .ok()
    });
    let cache = match &redis_client {
        Some(client) => Cache::new(Arc::new(RedisStore::new(
            client.clone(),
            config.cache_connect_timeout(),
        ))),
        None => {
            tracing::warn!("No Redis configured, using in-process cache");
            Cache::in_memory()
        }
    };

    let rate_limiter = Arc::new(RateLimiter::new(redis_client, &config));
    let state =
        AppState::build(config, cache, pool.clone()).expect("Failed to build application state");

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    let app = create_router(state, rate_limiter);

    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if let Some(pool) = pool {
        pool.close().await;
    }
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
