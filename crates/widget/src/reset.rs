//! Session reset coordinator.
//!
//! Sign-out must clear the chat SDK's client-side session on the visitor's
//! next page, and only that page:
//!
//! ```text
//! idle ──sign-out──▶ reset-pending ──next render──▶ reset-delivered (= idle)
//! ```
//!
//! The pending state lives in a short-lived browser cookie.  The render
//! that observes it clears it in the same response and emits one script
//! that waits (bounded) for `$chatwoot.reset` and calls it once.  If the
//! SDK never shows up the reset is dropped: at-most-once, no retry.
//!
//! Read-then-clear is not atomic across tabs; two tabs rendering during
//! the window may both reset, or one may miss it.

use std::time::Duration;

use cw_domain::config::SiteConfig;
use cw_domain::settings::WidgetSettings;
use cw_domain::trace::TraceEvent;

use crate::console::ConsoleLog;
use crate::readiness::ReadinessWait;

pub const MARKER_COOKIE: &str = "chatwoot_reset_needed";
pub const MARKER_VALUE: &str = "1";
/// Safety bound: a marker nobody consumes disappears on its own.
pub const MARKER_MAX_AGE_SECS: u64 = 300;

/// Poll every second for up to ten seconds.
pub const RESET_WAIT: ReadinessWait =
    ReadinessWait::new(Duration::from_millis(1000), Duration::from_millis(10_000));

/// Cookie scope shared with the rest of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieScope {
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
}

impl Default for CookieScope {
    fn default() -> Self {
        Self {
            path: "/".into(),
            domain: None,
            secure: false,
        }
    }
}

impl CookieScope {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            path: site.cookie_path.clone(),
            domain: site
                .cookie_domain
                .as_ref()
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            secure: site.secure_cookies,
        }
    }

    fn attributes(&self) -> String {
        let mut attrs = format!("Path={}", self.path);
        if let Some(ref domain) = self.domain {
            attrs.push_str("; Domain=");
            attrs.push_str(domain);
        }
        attrs.push_str("; SameSite=Lax; HttpOnly");
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs
    }
}

/// Read one cookie from a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    Idle,
    ResetPending,
}

/// What a render adds to the response on behalf of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetOutcome {
    /// `Set-Cookie` value invalidating the marker.
    pub clear_cookie: Option<String>,
    /// `<script>` block invoking the SDK reset.
    pub script: Option<String>,
}

impl ResetOutcome {
    pub fn delivered(&self) -> bool {
        self.script.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetCoordinator {
    scope: CookieScope,
}

impl ResetCoordinator {
    pub fn new(scope: CookieScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &CookieScope {
        &self.scope
    }

    /// `Set-Cookie` value entering `reset-pending`, or `None` when the
    /// widget was never configured (nothing to reset).
    pub fn on_sign_out(&self, settings: &WidgetSettings) -> Option<String> {
        if !settings.is_configured() {
            return None;
        }
        TraceEvent::ResetMarked {
            max_age_secs: MARKER_MAX_AGE_SECS,
        }
        .emit();
        Some(format!(
            "{MARKER_COOKIE}={MARKER_VALUE}; {}; Max-Age={MARKER_MAX_AGE_SECS}",
            self.scope.attributes()
        ))
    }

    /// Current phase as seen in the request cookies.
    pub fn phase(&self, cookie_header: Option<&str>) -> ResetPhase {
        match cookie_header.and_then(|h| cookie_value(h, MARKER_COOKIE)) {
            Some(MARKER_VALUE) => ResetPhase::ResetPending,
            _ => ResetPhase::Idle,
        }
    }

    /// Consume the marker if present: clear it and emit the reset script.
    pub fn on_render(
        &self,
        settings: &WidgetSettings,
        cookie_header: Option<&str>,
    ) -> ResetOutcome {
        if !settings.is_configured() || self.phase(cookie_header) == ResetPhase::Idle {
            return ResetOutcome::default();
        }
        ResetOutcome {
            clear_cookie: Some(self.clear_cookie()),
            script: Some(reset_script(ConsoleLog::new(settings.debug_mode))),
        }
    }

    /// `Set-Cookie` value that expires the marker immediately.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{MARKER_COOKIE}=; {}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.scope.attributes()
        )
    }
}

/// Script waiting for `$chatwoot.reset` and calling it exactly once.
pub fn reset_script(console: ConsoleLog) -> String {
    format!(
        "\
<script>
(function () {{
{prelude}{helper}
cwWaitFor(function () {{
  return window.$chatwoot && typeof window.$chatwoot.reset === 'function';
}}, function () {{
  log('detected after logout, resetting session');
  window.$chatwoot.reset();
  log('session reset complete');
}}, function () {{
  log('timed out waiting for the SDK after logout');
}});
}})();
</script>
",
        prelude = console.prelude(),
        helper = RESET_WAIT.helper("cwWaitFor"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> WidgetSettings {
        WidgetSettings {
            base_url: "https://app.chatwoot.com".into(),
            widget_token: "tok".into(),
            ..Default::default()
        }
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let h = "a=1; chatwoot_reset_needed=1; b=two";
        assert_eq!(cookie_value(h, MARKER_COOKIE), Some("1"));
        assert_eq!(cookie_value(h, "b"), Some("two"));
        assert_eq!(cookie_value(h, "missing"), None);
        assert_eq!(cookie_value("", MARKER_COOKIE), None);
    }

    #[test]
    fn sign_out_sets_marker_with_scope() {
        let c = ResetCoordinator::new(CookieScope {
            path: "/shop".into(),
            domain: Some("example.com".into()),
            secure: true,
        });
        let cookie = c.on_sign_out(&configured()).unwrap();
        assert!(cookie.starts_with("chatwoot_reset_needed=1; "));
        assert!(cookie.contains("Path=/shop"));
        assert!(cookie.contains("Domain=example.com"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.ends_with("Max-Age=300"));
    }

    #[test]
    fn sign_out_is_noop_when_unconfigured() {
        let c = ResetCoordinator::default();
        assert!(c.on_sign_out(&WidgetSettings::default()).is_none());
    }

    #[test]
    fn render_consumes_marker_once() {
        let c = ResetCoordinator::default();
        let s = configured();

        let first = c.on_render(&s, Some("chatwoot_reset_needed=1"));
        assert!(first.delivered());
        let clear = first.clear_cookie.unwrap();
        assert!(clear.starts_with("chatwoot_reset_needed=; "));
        assert!(clear.contains("Max-Age=0"));
        let script = first.script.unwrap();
        assert_eq!(script.matches("window.$chatwoot.reset();").count(), 1);

        // The browser no longer sends the cookie on the next request.
        let second = c.on_render(&s, None);
        assert_eq!(second, ResetOutcome::default());
    }

    #[test]
    fn other_marker_values_are_ignored() {
        let c = ResetCoordinator::default();
        assert_eq!(c.phase(Some("chatwoot_reset_needed=0")), ResetPhase::Idle);
        assert!(!c
            .on_render(&configured(), Some("chatwoot_reset_needed="))
            .delivered());
    }

    #[test]
    fn render_is_noop_when_unconfigured() {
        let c = ResetCoordinator::default();
        let out = c.on_render(&WidgetSettings::default(), Some("chatwoot_reset_needed=1"));
        assert_eq!(out, ResetOutcome::default());
    }

    #[test]
    fn reset_script_polls_every_second_for_ten() {
        let js = reset_script(ConsoleLog::new(false));
        assert!(js.contains("setInterval(check, 1000)"));
        assert!(js.contains(">= 10000"));
        assert!(!js.contains("console."));
    }
}
