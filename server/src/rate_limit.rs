//! In-memory rate limiting for the generative-text endpoints.
//!
//! DESIGN
//! ======
//! Sliding-window counters keyed by client address
//! (`HashMap<String, VecDeque<Instant>>`). Three limits:
//! - Per-client: 10 generator requests/min
//! - Global: 20 upstream calls/min
//! - Token budget: 50k tokens/client/hour
//!
//! TRADE-OFFS
//! ==========
//! A call reserves `max_tokens` of budget before it goes upstream so that
//! concurrent requests see each other. The reservation is settled with the
//! real usage on success and released on failure.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::parse_or;
use crate::error::ErrorCode;

const DEFAULT_PER_CLIENT_LIMIT: usize = 10;
const DEFAULT_PER_CLIENT_WINDOW_SECS: u64 = 60;

const DEFAULT_GLOBAL_LIMIT: usize = 20;
const DEFAULT_GLOBAL_WINDOW_SECS: u64 = 60;

const DEFAULT_TOKEN_BUDGET: u64 = 50_000;
const DEFAULT_TOKEN_WINDOW_SECS: u64 = 3600;

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_client_limit: usize,
    pub per_client_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
    pub token_budget: u64,
    pub token_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_client_limit: DEFAULT_PER_CLIENT_LIMIT,
            per_client_window: Duration::from_secs(DEFAULT_PER_CLIENT_WINDOW_SECS),
            global_limit: DEFAULT_GLOBAL_LIMIT,
            global_window: Duration::from_secs(DEFAULT_GLOBAL_WINDOW_SECS),
            token_budget: DEFAULT_TOKEN_BUDGET,
            token_window: Duration::from_secs(DEFAULT_TOKEN_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| Duration::from_secs(parse_or(&lookup, key, default));
        Self {
            per_client_limit: parse_or(&lookup, "RATE_LIMIT_PER_CLIENT", DEFAULT_PER_CLIENT_LIMIT),
            per_client_window: secs("RATE_LIMIT_PER_CLIENT_WINDOW_SECS", DEFAULT_PER_CLIENT_WINDOW_SECS),
            global_limit: parse_or(&lookup, "RATE_LIMIT_GLOBAL", DEFAULT_GLOBAL_LIMIT),
            global_window: secs("RATE_LIMIT_GLOBAL_WINDOW_SECS", DEFAULT_GLOBAL_WINDOW_SECS),
            token_budget: parse_or(&lookup, "RATE_LIMIT_TOKEN_BUDGET", DEFAULT_TOKEN_BUDGET),
            token_window: secs("RATE_LIMIT_TOKEN_WINDOW_SECS", DEFAULT_TOKEN_WINDOW_SECS),
        }
    }
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("per-client rate limit exceeded (max {limit} requests/{window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("global rate limit exceeded (max {limit} requests/{window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
    #[error("token budget exceeded (max {budget} tokens/{window_secs}s)")]
    TokenBudgetExceeded { budget: u64, window_secs: u64 },
}

impl ErrorCode for RateLimitError {
    fn error_code(&self) -> &'static str {
        "E_RATE_LIMITED"
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

#[derive(Default)]
struct RateLimiterInner {
    /// Per-client request timestamps.
    client_requests: HashMap<String, VecDeque<Instant>>,
    /// Global request timestamps.
    global_requests: VecDeque<Instant>,
    /// Per-client token usage: (timestamp, `token_count`).
    client_tokens: HashMap<String, VecDeque<(Instant, u64)>>,
    /// Per-client in-flight reservations: (timestamp, reserved tokens).
    client_token_reservations: HashMap<String, VecDeque<(Instant, u64)>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(RateLimiterInner::default())), config }
    }

    /// Check both per-client and global limits, then record the request.
    ///
    /// # Errors
    ///
    /// Returns the first limit that is already exhausted.
    pub fn check_and_record(&self, client: &str) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    fn check_and_record_at(&self, client: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cfg = self.config;
        inner.sweep(now, cfg);

        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        let client_count = inner.client_requests.get(client).map_or(0, VecDeque::len);
        if client_count >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        inner.client_requests.entry(client.to_string()).or_default().push_back(now);
        inner.global_requests.push_back(now);
        Ok(())
    }

    /// Reserve budget before an upstream call. Atomic with the check.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::TokenBudgetExceeded`] if the reservation
    /// would overrun the budget.
    pub fn reserve_token_budget(&self, client: &str, reserved_tokens: u64) -> Result<(), RateLimitError> {
        self.reserve_token_budget_at(client, reserved_tokens, Instant::now())
    }

    fn reserve_token_budget_at(&self, client: &str, reserved_tokens: u64, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let cfg = self.config;
        let exceeded =
            || RateLimitError::TokenBudgetExceeded { budget: cfg.token_budget, window_secs: cfg.token_window.as_secs() };

        let used = windowed_sum(&mut inner.client_tokens, client, now, cfg.token_window);
        let reserved = windowed_sum(&mut inner.client_token_reservations, client, now, cfg.token_window);
        let projected = used
            .checked_add(reserved)
            .and_then(|n| n.checked_add(reserved_tokens))
            .ok_or_else(exceeded)?;

        let over = if reserved_tokens == 0 { projected >= cfg.token_budget } else { projected > cfg.token_budget };
        if over {
            return Err(exceeded());
        }
        if reserved_tokens > 0 {
            inner
                .client_token_reservations
                .entry(client.to_string())
                .or_default()
                .push_back((now, reserved_tokens));
        }
        Ok(())
    }

    /// Settle a reservation with the tokens actually used.
    pub fn record_tokens(&self, client: &str, tokens: u64, reserved_tokens: u64) {
        self.record_tokens_at(client, tokens, reserved_tokens, Instant::now());
    }

    fn record_tokens_at(&self, client: &str, tokens: u64, reserved_tokens: u64, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.config.token_window;
        release(&mut inner.client_token_reservations, client, reserved_tokens, now, window);
        if tokens == 0 {
            return;
        }
        let usage = inner.client_tokens.entry(client.to_string()).or_default();
        prune_token_window(usage, now, window);
        usage.push_back((now, tokens));
    }

    /// Drop a reservation for a call that failed.
    pub fn release_reserved_tokens(&self, client: &str, reserved_tokens: u64) {
        self.release_reserved_tokens_at(client, reserved_tokens, Instant::now());
    }

    fn release_reserved_tokens_at(&self, client: &str, reserved_tokens: u64, now: Instant) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        release(&mut inner.client_token_reservations, client, reserved_tokens, now, self.config.token_window);
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> (usize, usize, usize) {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (inner.client_requests.len(), inner.client_tokens.len(), inner.client_token_reservations.len())
    }
}

impl RateLimiterInner {
    /// Prune every window and forget clients with nothing left in it.
    fn sweep(&mut self, now: Instant, cfg: RateLimitConfig) {
        prune_window(&mut self.global_requests, now, cfg.global_window);
        self.client_requests.retain(|_, deque| {
            prune_window(deque, now, cfg.per_client_window);
            !deque.is_empty()
        });
        for map in [&mut self.client_tokens, &mut self.client_token_reservations] {
            map.retain(|_, deque| {
                prune_token_window(deque, now, cfg.token_window);
                !deque.is_empty()
            });
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

fn prune_token_window(deque: &mut VecDeque<(Instant, u64)>, now: Instant, window: Duration) {
    while let Some(&(front, _)) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

/// Tokens in `client`'s window. Drops the entry once it is empty.
fn windowed_sum(map: &mut HashMap<String, VecDeque<(Instant, u64)>>, client: &str, now: Instant, window: Duration) -> u64 {
    let Some(deque) = map.get_mut(client) else {
        return 0;
    };
    prune_token_window(deque, now, window);
    let sum = deque.iter().map(|(_, t)| t).sum();
    if deque.is_empty() {
        map.remove(client);
    }
    sum
}

fn release(
    map: &mut HashMap<String, VecDeque<(Instant, u64)>>,
    client: &str,
    amount: u64,
    now: Instant,
    window: Duration,
) {
    let Some(deque) = map.get_mut(client) else {
        return;
    };
    prune_token_window(deque, now, window);
    consume_reserved_tokens(deque, amount);
    if deque.is_empty() {
        map.remove(client);
    }
}

fn consume_reserved_tokens(deque: &mut VecDeque<(Instant, u64)>, mut amount: u64) {
    while amount > 0 {
        let Some((_, front_tokens)) = deque.front_mut() else {
            break;
        };
        if *front_tokens <= amount {
            amount -= *front_tokens;
            deque.pop_front();
        } else {
            *front_tokens -= amount;
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
