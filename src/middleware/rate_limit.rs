use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    hits: u32,
}

/// Fixed one-second window limiter shared across the integration API group.
/// A long-running match stream holds its slot only for the initial request.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                hits: 0,
            })),
        }
    }

    fn allow(&self) -> bool {
        let mut window = self.window.lock().expect("rate limiter mutex poisoned");
        if window.opened_at.elapsed() >= Duration::from_secs(1) {
            window.opened_at = Instant::now();
            window.hits = 0;
        }
        if window.hits >= self.rps {
            return false;
        }
        window.hits += 1;
        true
    }
}

pub async fn rps_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.allow() {
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}
