//! HTTP middleware: request ids, logging, rate limiting, authentication

use crate::auth::{extract_bearer_token, session_for_token};
use crate::error::ApiError;
use crate::state::{AppState, AuthUser};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use governor::{state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Rate limiter keyed by client IP.
pub type KeyedRateLimiter =
    RateLimiter<String, DefaultKeyedStateStore<String>, governor::clock::DefaultClock>;

/// State for the rate-limit middleware.
#[derive(Clone)]
pub struct RateLimit {
    pub limiter: Arc<KeyedRateLimiter>,
    /// Trust `X-Forwarded-For` for the client IP.
    pub behind_proxy: bool,
}

/// Create a per-IP rate limiter.
pub fn create_rate_limiter(requests_per_second: u32, burst: u32) -> Arc<KeyedRateLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second.max(1)).unwrap())
        .allow_burst(NonZeroU32::new(burst.max(1)).unwrap());
    Arc::new(RateLimiter::keyed(quota))
}

/// Periodically drop idle buckets so the key map stays bounded.
pub fn spawn_rate_limiter_sweep(limiter: Arc<KeyedRateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.retain_recent();
        }
    });
}

/// Best-effort client IP for rate-limit keying.
fn client_ip(request: &Request<Body>, behind_proxy: bool) -> String {
    if behind_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
        {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip(&request, rate_limit.behind_proxy);
    if rate_limit.limiter.check_key(&key).is_err() {
        tracing::debug!(ip = %key, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(request).await)
}

/// Authentication middleware
///
/// Resolves the bearer token to an [`AuthUser`] and stores it in request
/// extensions. With auth disabled, every request runs as the dev user.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.auth_enabled {
        let user_id = state.dev_user_id.unwrap_or_default();
        request.extensions_mut().insert(AuthUser::dev(user_id));
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let session = match auth_header {
        Some(header) => {
            let token = extract_bearer_token(header)
                .ok_or(ApiError::Unauthorized("invalid Authorization header format"))?;
            session_for_token(&state, token).await?
        }
        None => return Err(ApiError::Unauthorized("authentication required")),
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Request ID middleware - adds an x-request-id header
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

/// Request ID extension
#[derive(Clone)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rate_limiter() {
        let limiter = create_rate_limiter(100, 100);
        assert!(limiter.check_key(&"1.2.3.4".to_string()).is_ok());
    }

    #[test]
    fn test_burst_exhaustion() {
        let limiter = create_rate_limiter(1, 2);
        let key = "5.6.7.8".to_string();
        assert!(limiter.check_key(&key).is_ok());
        assert!(limiter.check_key(&key).is_ok());
        assert!(limiter.check_key(&key).is_err());
        // Other keys are unaffected.
        assert!(limiter.check_key(&"9.9.9.9".to_string()).is_ok());
    }

    #[test]
    fn test_client_ip_from_forwarded_header() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, true), "203.0.113.9");
        // Header is ignored unless the server is marked as proxied.
        assert_eq!(client_ip(&request, false), "unknown");
    }
}
