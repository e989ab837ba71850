//! `GET|POST /chatwoot/logout`: sign-out hook.
//!
//! The site's own sign-out flow redirects here (or links here directly).
//! The response sets the reset marker and sends the browser on to
//! `redirect_to`, which must be a same-site path.

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LogoutQuery {
    #[serde(default)]
    pub redirect_to: Option<String>,
}

pub async fn logout(State(state): State<AppState>, Query(q): Query<LogoutQuery>) -> Response {
    let target = safe_redirect(q.redirect_to.as_deref());
    let settings = state.settings.snapshot();

    let mut resp = StatusCode::SEE_OTHER.into_response();
    let headers = resp.headers_mut();
    match HeaderValue::from_str(&target) {
        Ok(v) => headers.insert(header::LOCATION, v),
        Err(_) => headers.insert(header::LOCATION, HeaderValue::from_static("/")),
    };
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if let Some(cookie) = state
        .reset
        .on_sign_out(&settings)
        .and_then(|c| HeaderValue::from_str(&c).ok())
    {
        headers.append(header::SET_COOKIE, cookie);
    }
    resp
}

/// Same-site relative path, or `/`.
///
/// Rejects absolute and scheme-relative URLs (`//host`, `/\host`) so the
/// hook cannot be used as an open redirect.
pub fn safe_redirect(requested: Option<&str>) -> String {
    let Some(path) = requested.map(str::trim).filter(|p| !p.is_empty()) else {
        return "/".into();
    };
    let ok = path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control);
    if ok {
        path.to_owned()
    } else {
        tracing::debug!(requested = %path, "rejected logout redirect target");
        "/".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_pass() {
        assert_eq!(safe_redirect(Some("/shop?x=1")), "/shop?x=1");
        assert_eq!(safe_redirect(Some("/")), "/");
    }

    #[test]
    fn missing_or_foreign_targets_fall_back() {
        assert_eq!(safe_redirect(None), "/");
        assert_eq!(safe_redirect(Some("")), "/");
        assert_eq!(safe_redirect(Some("https://evil.example/")), "/");
        assert_eq!(safe_redirect(Some("//evil.example")), "/");
        assert_eq!(safe_redirect(Some("/\\evil.example")), "/");
        assert_eq!(safe_redirect(Some("/a\r\nSet-Cookie: x=1")), "/");
        assert_eq!(safe_redirect(Some("javascript:alert(1)")), "/");
    }
}
