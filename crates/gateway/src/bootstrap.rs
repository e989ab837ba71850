//! AppState construction extracted from `main.rs`.
//!
//! `serve` and the one-shot CLI commands (`render`, `sign`, `settings`)
//! share this boot path so they see exactly the settings a render would.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use cw_commerce::create_lookup;
use cw_domain::config::{Config, ConfigSeverity};
use cw_widget::reset::CookieScope;
use cw_widget::{DateStyle, ResetCoordinator};

use crate::settings_store::SettingsStore;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Widget settings ──────────────────────────────────────────────
    let settings = Arc::new(
        open_settings(&config).context("loading widget settings")?,
    );
    let snapshot = settings.snapshot();
    tracing::info!(
        configured = snapshot.is_configured(),
        identity = snapshot.has_identity_secret(),
        path = %settings.persist_path().display(),
        "widget settings ready"
    );

    // ── Customer profiles ────────────────────────────────────────────
    let profiles = create_lookup(&config.commerce).context("initializing profile lookup")?;
    tracing::info!(source = profiles.source(), "profile lookup ready");

    // ── Rendering helpers ────────────────────────────────────────────
    let dates = Arc::new(DateStyle::new(&config.site.date_format, &config.site.timezone));
    let reset = Arc::new(ResetCoordinator::new(CookieScope::from_site(&config.site)));

    // ── Admin token (read once, hash for constant-time comparison) ──
    let admin_token_hash = {
        let env_var = &config.admin.token_env;
        match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
            Some(t) => {
                tracing::info!(source = %format!("env:{env_var}"), "admin token auth enabled");
                Some(Sha256::digest(t.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!(
                    "admin token auth DISABLED; settings changes are accepted from localhost only, set the {env_var} env var to protect /admin/chatwoot"
                );
                None
            }
        }
    };

    if config.site.trust_identity_headers {
        tracing::warn!(
            header = %config.site.identity_headers.email,
            "trusting visitor identity headers; only expose the gateway behind the auth proxy"
        );
    }

    Ok(AppState {
        config,
        settings,
        profiles,
        reset,
        dates,
        admin_token_hash,
    })
}

/// The settings store alone, for CLI commands that need no other state.
pub fn open_settings(config: &Config) -> anyhow::Result<SettingsStore> {
    SettingsStore::open(&config.chatwoot).with_context(|| {
        format!(
            "opening settings file {}",
            config.chatwoot.settings_path.display()
        )
    })
}
