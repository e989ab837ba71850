//! Health probe and admin system info.

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

use super::guard::AdminGuard;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /healthz: lightweight health probe (public, no auth)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "widget_configured": state.settings.snapshot().is_configured(),
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /admin/chatwoot/info: effective configuration (admin)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn system_info(_guard: AdminGuard, State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings.snapshot();
    let scope = state.reset.scope();

    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "server": {
            "host": state.config.server.host,
            "port": state.config.server.port,
        },
        "admin_token_set": state.admin_token_hash.is_some(),
        "widget": {
            "configured": settings.is_configured(),
            "identity_enabled": settings.has_identity_secret(),
            "hmac_pinned_by_env": state.settings.hmac_pinned(),
            "settings": settings.redacted(),
            "settings_path": state.settings.persist_path().display().to_string(),
        },
        "site": {
            "pages_dir": state.config.site.pages_dir.display().to_string(),
            "trust_identity_headers": state.config.site.trust_identity_headers,
            "cookie_path": scope.path,
            "cookie_domain": scope.domain,
            "secure_cookies": scope.secure,
        },
        "profile_source": state.profiles.source(),
    }))
}
