//! Admin auth guard: `AdminGuard` Axum extractor.
//!
//! Handlers opt in by adding `_guard: AdminGuard` to their parameter list.
//! The admin token is accepted either as `Authorization: Bearer <token>`
//! (scripts) or as the password of `Authorization: Basic` (browsers, any
//! user name), so the settings form works from a plain browser prompt.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine as _;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

pub const REALM: &str = "chatwoot-gate admin";

/// Axum extractor that enforces the admin token.
///
/// Uses SHA-256 + constant-time comparison so neither the token nor its
/// length leaks through timing.  If the admin token env var is not set
/// (dev mode), reads pass but changes are only accepted from a loopback
/// peer.
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected_hash = match &state.admin_token_hash {
            Some(h) => h,
            None => {
                let peer = parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ci| ci.0);
                if dev_mode_allows(&parts.method, peer) {
                    return Ok(AdminGuard);
                }
                tracing::warn!(
                    method = %parts.method,
                    peer = ?peer,
                    "admin change refused: no admin token set and peer is not loopback"
                );
                return Err((
                    StatusCode::FORBIDDEN,
                    "admin changes without an admin token are only accepted from localhost",
                )
                    .into_response());
            }
        };

        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(presented_token)
            .unwrap_or_default();

        let provided_hash = Sha256::digest(provided.as_bytes());
        if !bool::from(provided_hash.ct_eq(expected_hash.as_slice())) {
            return Err(unauthorized());
        }
        Ok(AdminGuard)
    }
}

/// Without an admin token: reads from anywhere, writes from loopback only.
/// An unknown peer counts as remote.
pub fn dev_mode_allows(method: &Method, peer: Option<SocketAddr>) -> bool {
    if matches!(*method, Method::GET | Method::HEAD) {
        return true;
    }
    peer.is_some_and(|addr| addr.ip().is_loopback())
}

/// Token carried by an `Authorization` header value.
pub fn presented_token(value: &str) -> Option<String> {
    if let Some(token) = value.strip_prefix("Bearer ") {
        return Some(token.trim().to_owned());
    }
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (_user, password) = decoded.split_once(':')?;
    Some(password.to_owned())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            format!("Basic realm=\"{REALM}\", charset=\"UTF-8\""),
        )],
        "admin token required",
    )
        .into_response()
}
