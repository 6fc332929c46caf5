use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use deadpool_redis::{Config, Pool, Runtime};
use thiserror::Error;
use tracing::{debug, warn};

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("Redis connection error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    PoolError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    pub count: u64,
    pub retry_after_secs: u64,
}

/// Counts requests per identifier inside a fixed window that expires on its own.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn hit(&self, identifier: &str) -> Result<RateDecision, RateLimitError>;
}

pub struct RedisRateLimiter {
    pool: Pool,
    max_requests: u32,
    window_secs: u64,
}

impl RedisRateLimiter {
    pub fn new(redis_url: &str, max_requests: u32, window_secs: u64) -> Result<Self, RateLimitError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RateLimitError::PoolError(format!("Pool creation error: {}", e)))?;

        Ok(Self { pool, max_requests, window_secs })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, identifier: &str) -> Result<RateDecision, RateLimitError> {
        let mut conn = self.pool.get().await
            .map_err(|e| RateLimitError::PoolError(format!("Connection error: {}", e)))?;

        let key = format!("rate_limit:{}", identifier);

        // The window starts with the first hit; SET NX keeps later hits from extending it.
        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("SET").arg(&key).arg(0).arg("EX").arg(self.window_secs).arg("NX").ignore()
            .incr(&key, 1)
            .ttl(&key)
            .query_async(&mut conn)
            .await?;

        Ok(RateDecision {
            allowed: count <= self.max_requests as u64,
            count,
            retry_after_secs: ttl.max(0) as u64,
        })
    }
}

/// Identify the client by the first forwarded address, falling back to a shared bucket.
pub fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("anonymous")
        .to_string()
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<dyn RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identifier = client_identifier(request.headers());

    match limiter.hit(&identifier).await {
        Ok(decision) if !decision.allowed => {
            warn!("Rate limit exceeded for {} ({} requests)", identifier, decision.count);
            return Err(AppError::TooManyRequests(format!(
                "Too many requests, please try again in {} seconds",
                decision.retry_after_secs
            )));
        }
        Ok(decision) => debug!("Rate limit count for {}: {}", identifier, decision.count),
        Err(e) => warn!("Rate limiter unavailable, allowing request: {}", e),
    }

    Ok(next.run(request).await)
}
