use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use log::{debug, info, warn};

use crate::error_response;

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Expired windows are swept, at most once per window, once the table grows past this many
/// clients.
const RATE_LIMIT_SWEEP_THRESHOLD: usize = 10_000;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter per client address.
#[derive(Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: Arc<DashMap<IpAddr, Window>>,
    last_sweep: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self::with_window(limit, RATE_LIMIT_WINDOW)
    }

    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Drops expired windows when the table is large and no sweep ran within the last window.
    /// A sweep already running elsewhere counts as recent.
    fn sweep_expired(&self, now: Instant) -> bool {
        if self.clients.len() <= RATE_LIMIT_SWEEP_THRESHOLD {
            return false;
        }
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return false;
        };
        if now.saturating_duration_since(*last_sweep) < self.window {
            return false;
        }
        *last_sweep = now;
        let before = self.clients.len();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        debug!(
            "Swept {} expired rate-limit windows",
            before.saturating_sub(self.clients.len())
        );
        true
    }

    /// Counts one request from `ip` and reports whether it is still within the limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        self.sweep_expired(now);
        let mut window = self.clients.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        window.count = window.count.saturating_add(1);
        window.count <= self.limit
    }
}

/// Number of requests currently being served.
#[derive(Clone, Default)]
pub struct InFlightRequests(Arc<AtomicUsize>);

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

struct InFlightGuard(InFlightRequests);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) async fn track_in_flight(
    State(in_flight): State<InFlightRequests>,
    request: Request,
    next: Next,
) -> Response {
    in_flight.0.fetch_add(1, Ordering::SeqCst);
    let _guard = InFlightGuard(in_flight);
    next.run(request).await
}

pub(crate) async fn log_request(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri().path());
    debug!("Request headers: {:?}", request.headers());
    if let Some(query) = request.uri().query() {
        debug!("Request query: {}", query);
    }
    next.run(request).await
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub(crate) async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    if !limiter.check(ip) {
        warn!("Rate limit exceeded for {}", ip);
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later.",
        );
    }
    next.run(request).await
}
