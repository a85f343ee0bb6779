use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    config::Config,
    utils::{error_codes, error_to_api_response},
};

/// Per-IP fixed-window limiter counting requests in Redis
#[derive(Clone)]
pub struct RateLimiter {
    redis: Option<Arc<redis::Client>>,
    window: Duration,
    max_requests: u32,
    timeout: Duration,
}

impl RateLimiter {
    /// Without a Redis client every request is let through
    pub fn new(redis: Option<redis::Client>, config: &Config) -> Self {
        Self {
            redis: redis.map(Arc::new),
            // A zero window would create counters that never expire
            window: config.rate_limit_window().max(Duration::from_secs(1)),
            max_requests: config.rate_limit_requests,
            timeout: config.cache_connect_timeout(),
        }
    }

    fn client_ip(req: &Request<Body>) -> String {
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());

        req.headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .or_else(|| {
                req.headers()
                    .get("x-forwarded-for")
                    .and_then(|h| h.to_str().ok())
                    .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
            })
            .or(remote_ip.as_deref())
            .unwrap_or("unknown")
            .trim()
            .to_string()
    }

    /// Requests counted in the current window, or `None` when Redis is unusable
    async fn hit(&self, ip: &str) -> Option<u32> {
        let redis = self.redis.as_ref()?;
        let key = format!("rate_limit:{}", ip);

        let counted = async {
            let mut conn = redis.get_multiplexed_async_connection().await?;
            let (count,): (u32,) = window_counter(&key, self.window)
                .query_async(&mut conn)
                .await?;
            Ok::<u32, redis::RedisError>(count)
        };

        match tokio::time::timeout(self.timeout, counted).await {
            Ok(Ok(count)) => Some(count),
            Ok(Err(e)) => {
                tracing::warn!("Rate limiter unavailable, letting request through: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Rate limiter timed out, letting request through");
                None
            }
        }
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        let ip = Self::client_ip(&req);

        if let Some(count) = self.hit(&ip).await
            && count > self.max_requests
        {
            tracing::info!("Rate limit exceeded for {}", ip);
            return (
                StatusCode::TOO_MANY_REQUESTS,
                error_to_api_response::<()>(
                    error_codes::RATE_LIMIT,
                    format!(
                        "Too many requests, please retry in {} seconds",
                        self.window.as_secs()
                    ),
                ),
            )
                .into_response();
        }

        next.run(req).await
    }
}

/// `SET key 0 EX window NX` then `INCR key` inside one MULTI/EXEC, so the
/// counter always carries a TTL from the moment it exists
fn window_counter(key: &str, window: Duration) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window.as_secs().max(1))
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}
