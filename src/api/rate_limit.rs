//! Rate limiting middleware for the generation endpoints
//!
//! Every route that reaches an external provider passes through a per-IP
//! token bucket. Status polling and system routes are not limited.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::RateLimitConfig;
use crate::error::ApiError;

/// Simple token bucket rate limiter
struct TokenBucket {
    /// Available tokens
    tokens: f64,
    /// Last refill time
    last_refill: Instant,
    /// Tokens per second
    rate: f64,
    /// Maximum burst size
    capacity: u32,
}

impl TokenBucket {
    fn new(rate: f64, capacity: u32) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: Instant::now(),
            rate,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity as f64);
        self.last_refill = now;
    }

    /// A full bucket behaves exactly like a fresh one
    fn is_full(&mut self) -> bool {
        self.refill();
        self.tokens >= self.capacity as f64
    }

    /// Take one token, or return the number of seconds until one is available
    fn try_consume(&mut self) -> Option<u64> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else if self.rate <= 0.0 {
            Some(60)
        } else {
            let wait_secs = ((1.0 - self.tokens) / self.rate).ceil() as u64;
            Some(wait_secs.max(1))
        }
    }
}

/// Rate limiter with per-IP tracking
pub struct RateLimiter {
    /// Per-IP token buckets
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
    /// Configuration
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter from configuration
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn is_ip_exempt(&self, ip: &IpAddr) -> bool {
        self.config.exempt_ips.contains(ip)
    }

    /// Check whether a request from `ip` may proceed
    ///
    /// Returns `None` when allowed, or the suggested retry delay in seconds.
    pub async fn check(&self, ip: IpAddr) -> Option<u64> {
        if self.is_ip_exempt(&ip) {
            return None;
        }

        let mut buckets = self.buckets.lock().await;
        let bucket = buckets.entry(ip).or_insert_with(|| {
            TokenBucket::new(
                f64::from(self.config.requests_per_minute) / 60.0,
                self.config.burst_size.max(1),
            )
        });
        bucket.try_consume()
    }

    /// Drop buckets that have refilled completely, returning how many went
    pub async fn prune_idle(&self) -> usize {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| !bucket.is_full());
        before - buckets.len()
    }

    /// Number of client addresses currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.buckets.lock().await.len()
    }

    /// Periodically prune idle buckets until `cancel_token` fires
    pub fn spawn_pruning(
        self: &Arc<Self>,
        interval: Duration,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // first tick fires immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let pruned = limiter.prune_idle().await;
                        if pruned > 0 {
                            tracing::debug!(pruned, "pruned idle rate limit buckets");
                        }
                    }
                    _ = cancel_token.cancelled() => break,
                }
            }
        })
    }
}

/// Rate limiting middleware function
///
/// The client address comes from `ConnectInfo`, which the server installs via
/// `into_make_service_with_connect_info`. Requests without it are let through.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied()
    else {
        return next.run(req).await;
    };

    match limiter.check(addr.ip()).await {
        None => next.run(req).await,
        Some(retry_after) => {
            tracing::debug!(
                ip = %addr.ip(),
                path = req.uri().path(),
                retry_after,
                "generation request rate limited"
            );
            ApiError::rate_limited(retry_after).into_response()
        }
    }
}
