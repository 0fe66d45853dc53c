use crate::error::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

/// One IP's request count within the current window.
#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request counter keyed by client IP.
///
/// Counters live in a [`DashMap`]; each request updates its IP's entry while
/// holding the entry guard, so concurrent bursts from the same address never
/// undercount.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    counters: DashMap<IpAddr, Window>,
}

/// Window state reported after counting a request.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until this IP's window resets.
    pub reset_seconds: u64,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            counters: DashMap::new(),
        }
    }

    /// Count one request for `ip` and report the resulting window state.
    ///
    /// A window that has elapsed is reset before counting, so the first
    /// request after expiry starts a fresh window.
    pub fn check(&self, ip: IpAddr) -> RateLimitDecision {
        let mut entry = self.counters.entry(ip).or_insert_with(|| Window {
            count: 0,
            started: Instant::now(),
        });

        if entry.started.elapsed() >= self.window {
            entry.count = 0;
            entry.started = Instant::now();
        }

        let allowed = entry.count < self.max_requests;
        if allowed {
            entry.count += 1;
        }

        let reset_seconds = self.window.saturating_sub(entry.started.elapsed()).as_secs();

        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests - entry.count,
            reset_seconds,
        }
    }
}

/// State for [`ip_rate_limit_middleware`].
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<FixedWindowLimiter>,
    /// Body of every rejected response, verbatim.
    pub message: String,
    /// Derive the client IP from `X-Forwarded-For` before falling back to
    /// the socket peer address.
    pub trust_proxy: bool,
}

fn client_ip(request: &Request, trust_proxy: bool) -> Option<IpAddr> {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Middleware for IP-based rate limiting.
///
/// Every response, allowed or rejected, carries the
/// `x-ratelimit-limit`/`-remaining`/`-reset` headers for the caller's
/// window. Requests whose client IP cannot be determined pass through with
/// a warning.
pub async fn ip_rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(ip) = client_ip(&request, state.trust_proxy) else {
        tracing::warn!("Could not determine IP for rate limiting");
        return next.run(request).await;
    };

    let decision = state.limiter.check(ip);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::debug!(client_ip = %ip, "rate limit exceeded");
        AppError::TooManyRequests(state.message.clone(), Some(decision.reset_seconds))
            .into_response()
    };

    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_seconds));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn requests_within_the_ceiling_are_allowed() {
        let limiter = FixedWindowLimiter::new(3, Duration::from_secs(60));

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check(ip(1));
            assert!(decision.allowed);
            assert_eq!(decision.limit, 3);
            assert_eq!(decision.remaining, expected_remaining);
        }
    }

    #[test]
    fn requests_over_the_ceiling_are_rejected_until_reset() {
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(60));
        limiter.check(ip(1));
        limiter.check(ip(1));

        let decision = limiter.check(ip(1));
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);

        // Still rejected within the same window.
        assert!(!limiter.check(ip(1)).allowed);
    }

    #[test]
    fn counters_are_tracked_per_ip() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(ip(1)).allowed);
        assert!(!limiter.check(ip(1)).allowed);

        assert!(limiter.check(ip(2)).allowed);
    }

    #[test]
    fn an_elapsed_window_resets_the_counter() {
        let limiter = FixedWindowLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check(ip(1)).allowed);
        assert!(!limiter.check(ip(1)).allowed);

        std::thread::sleep(Duration::from_millis(30));

        let decision = limiter.check(ip(1));
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn concurrent_bursts_from_one_ip_never_undercount() {
        let limiter = Arc::new(FixedWindowLimiter::new(50, Duration::from_secs(60)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..25).filter(|_| limiter.check(ip(1)).allowed).count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}
