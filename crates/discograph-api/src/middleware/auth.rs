// SPDX-License-Identifier: GPL-3.0-or-later
//! Admin-surface authentication (§6): `X-Api-Key` or `Authorization: Bearer`
//! compared in constant time against the configured secret. Unlike the stub
//! this started from, there is no allow-all fallback — a missing configured
//! key disables the admin surface rather than leaving it open.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use discograph_application::AppState;
use subtle::ConstantTimeEq;
use tracing::debug;

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get("X-Api-Key") {
        return value.to_str().ok();
    }
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn keys_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.server.admin_api_key.as_deref() else {
        debug!(target: "auth", "admin surface disabled: no admin_api_key configured");
        return (StatusCode::SERVICE_UNAVAILABLE, "admin surface disabled").into_response();
    };

    match presented_key(&headers) {
        Some(presented) if keys_match(expected, presented) => next.run(request).await,
        _ => {
            debug!(target: "auth", "rejected admin request: missing or invalid credentials");
            (StatusCode::UNAUTHORIZED, "missing or invalid authentication").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_match_in_constant_time() {
        assert!(keys_match("secret", "secret"));
    }

    #[test]
    fn differing_keys_do_not_match() {
        assert!(!keys_match("secret", "wrong"));
        assert!(!keys_match("secret", "secre"));
    }

    #[test]
    fn the_bearer_prefix_is_stripped_before_comparison() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer secret".parse().unwrap());
        assert_eq!(presented_key(&headers), Some("secret"));
    }

    #[test]
    fn the_api_key_header_is_preferred_over_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", "from-api-key".parse().unwrap());
        headers.insert("Authorization", "Bearer from-bearer".parse().unwrap());
        assert_eq!(presented_key(&headers), Some("from-api-key"));
    }
}
