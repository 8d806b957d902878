//! Shared types for the API layer.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::engine::Engine;

/// Fallback rate-limit key when no source address is known.
const ANONYMOUS_SOURCE: &str = "anonymous";

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: Arc<Engine>,
}

impl ApiContext {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

/// Extract the rate-limit source identity from request headers: the
/// first hop of `X-Forwarded-For` when a reverse proxy supplies it,
/// otherwise a shared anonymous bucket.
pub fn rate_limit_key(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| ANONYMOUS_SOURCE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_first_hop_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            "203.0.113.7, 10.0.0.1".parse().unwrap(),
        );
        assert_eq!(rate_limit_key(&headers), "203.0.113.7");
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(rate_limit_key(&HeaderMap::new()), "anonymous");
    }

    #[test]
    fn empty_header_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "".parse().unwrap());
        assert_eq!(rate_limit_key(&headers), "anonymous");
    }
}
