//! Per-request render: settings snapshot, optional profile lookup, then
//! the pure widget renderer.

use std::time::{Duration, Instant};

use cw_domain::trace::TraceEvent;
use cw_domain::visitor::{CustomerProfile, VisitorContext};
use cw_widget::{render_page_with, IdentityAssembler, PageFragments};

use crate::state::AppState;

/// Fragments for one page view.
pub async fn page_fragments(
    state: &AppState,
    visitor: &VisitorContext,
    cookie_header: Option<&str>,
) -> PageFragments {
    let settings = state.settings.snapshot();

    let customer = if IdentityAssembler::new(&settings, &state.dates).wants_identity(visitor) {
        match visitor.as_authenticated() {
            Some(v) => lookup_profile(state, &v.id).await,
            None => None,
        }
    } else {
        None
    };

    render_page_with(
        &state.reset,
        &settings,
        visitor,
        customer.as_ref(),
        &state.dates,
        cookie_header,
    )
}

/// Profile for the visitor, or `None` when the store has none or is down.
pub async fn lookup_profile(state: &AppState, visitor_id: &str) -> Option<CustomerProfile> {
    let deadline = Duration::from_millis(state.config.commerce.lookup_deadline_ms);
    let start = Instant::now();
    let result = tokio::time::timeout(deadline, state.profiles.customer_profile(visitor_id)).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let Ok(result) = result else {
        tracing::warn!(
            source = state.profiles.source(),
            visitor_id,
            deadline_ms = state.config.commerce.lookup_deadline_ms,
            "profile lookup exceeded deadline, identifying without enrichment"
        );
        return None;
    };

    match result {
        Ok(profile) => {
            TraceEvent::ProfileLookup {
                source: state.profiles.source().into(),
                visitor_id: visitor_id.into(),
                found: profile.is_some(),
                duration_ms,
            }
            .emit();
            profile
        }
        Err(e) => {
            tracing::warn!(
                source = state.profiles.source(),
                visitor_id,
                error = %e,
                "profile lookup failed, identifying without enrichment"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use cw_commerce::ProfileLookup;
    use cw_domain::config::Config;
    use cw_domain::error::Result;
    use cw_domain::settings::WidgetSettings;
    use cw_widget::{DateStyle, ResetCoordinator};

    use super::*;
    use crate::settings_store::SettingsStore;

    /// A shop that answers after `delay`.
    struct SlowShop {
        delay: Duration,
    }

    #[async_trait]
    impl ProfileLookup for SlowShop {
        async fn customer_profile(&self, _visitor_id: &str) -> Result<Option<CustomerProfile>> {
            tokio::time::sleep(self.delay).await;
            Ok(Some(CustomerProfile {
                billing_phone: Some("+1 555 0100".into()),
                ..Default::default()
            }))
        }

        fn source(&self) -> &'static str {
            "slow"
        }
    }

    fn state(dir: &tempfile::TempDir, delay: Duration, deadline_ms: u64) -> AppState {
        let mut config = Config::default();
        config.commerce.lookup_deadline_ms = deadline_ms;
        let seed = WidgetSettings {
            base_url: "https://app.chatwoot.com".into(),
            widget_token: "tok".into(),
            hmac_token: "s3cret".into(),
            ..Default::default()
        };
        AppState {
            config: Arc::new(config),
            settings: Arc::new(
                SettingsStore::with_override(seed, &dir.path().join("s.json"), None).unwrap(),
            ),
            profiles: Arc::new(SlowShop { delay }),
            reset: Arc::new(ResetCoordinator::default()),
            dates: Arc::new(DateStyle::default()),
            admin_token_hash: None,
        }
    }

    #[tokio::test]
    async fn slow_lookup_is_cut_off_at_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir, Duration::from_secs(5), 50);
        let visitor = VisitorContext::authenticated("7", "a@example.com", "Ana");

        let start = Instant::now();
        let page = page_fragments(&state, &visitor, None).await;
        assert!(start.elapsed() < Duration::from_secs(2));

        let footer = page.footer.unwrap();
        assert!(footer.contains("setUser("));
        assert!(!footer.contains("+1 555 0100"));
    }

    #[tokio::test]
    async fn lookup_within_deadline_enriches() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir, Duration::from_millis(1), 2000);
        let profile = lookup_profile(&state, "7").await.unwrap();
        assert_eq!(profile.billing_phone.as_deref(), Some("+1 555 0100"));
    }
}
