//! Script fragments spliced into a rendered page.

use std::time::Duration;

use cw_domain::settings::WidgetSettings;
use cw_domain::trace::TraceEvent;
use cw_domain::visitor::{CustomerProfile, VisitorContext};
use serde::Serialize;

use crate::console::ConsoleLog;
use crate::escape;
use crate::identity::{IdentityAssembler, VisitorIdentity};
use crate::profile::DateStyle;
use crate::readiness::ReadinessWait;
use crate::reset::ResetCoordinator;

/// Delay between SDK readiness and the first call into it.
pub const SETTLE_DELAY_MS: u64 = 1500;
/// Gap between `setUser` and `setCustomAttributes`.
pub const PAGE_CONTEXT_GAP_MS: u64 = 500;
/// DOM event the SDK fires on `window` once it is usable.
pub const READY_EVENT: &str = "chatwoot:ready";

fn sdk_wait() -> ReadinessWait {
    ReadinessWait::new(Duration::from_millis(250), Duration::from_secs(15)).with_event(READY_EVENT)
}

/// `window.chatwootSettings`, read by the SDK when it boots.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SdkAppearance<'a> {
    hide_message_bubble: bool,
    show_unread_messages_dialog: bool,
    position: &'a str,
    locale: &'a str,
    use_browser_language: bool,
    #[serde(rename = "type")]
    widget_type: &'a str,
    dark_mode: &'a str,
}

impl<'a> SdkAppearance<'a> {
    fn from_settings(s: &'a WidgetSettings) -> Self {
        Self {
            hide_message_bubble: s.hide_message_bubble,
            show_unread_messages_dialog: s.show_unread_dialog,
            position: s.position.as_str(),
            locale: s.locale.trim(),
            use_browser_language: s.use_browser_language,
            widget_type: s.widget_type.as_str(),
            dark_mode: s.dark_mode.as_str(),
        }
    }
}

/// What one render adds to a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFragments {
    /// Goes before `</head>`: the one-shot session reset, if pending.
    pub head: Option<String>,
    /// Goes before `</body>`: settings, SDK loader and identity calls.
    pub footer: Option<String>,
    /// `Set-Cookie` value to append to the response.
    pub set_cookie: Option<String>,
}

impl PageFragments {
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.footer.is_none() && self.set_cookie.is_none()
    }
}

/// Footer script blocks for the widget; `None` when unconfigured.
pub fn render_widget(settings: &WidgetSettings, identity: Option<&VisitorIdentity>) -> Option<String> {
    if !settings.is_configured() {
        return None;
    }
    let console = ConsoleLog::new(settings.debug_mode);
    let mut out = String::with_capacity(4096);

    out.push_str("<script>\nwindow.chatwootSettings = ");
    out.push_str(&escape::js_json(&SdkAppearance::from_settings(settings)));
    out.push_str(";\n</script>\n");

    out.push_str(&loader_script(console, settings));
    out.push_str(&visitor_script(console, identity));
    Some(out)
}

fn loader_script(console: ConsoleLog, settings: &WidgetSettings) -> String {
    format!(
        "\
<script>
(function (d, t) {{
{prelude}  var BASE_URL = {base_url};
  var g = d.createElement(t), s = d.getElementsByTagName(t)[0];
  g.src = BASE_URL + '/packs/js/sdk.js';
  g.id = 'chatwoot-sdk';
  g.defer = true;
  g.async = true;
  g.onerror = function () {{
    warn('SDK script failed to load from', g.src);
  }};
  g.onload = function () {{
    log('SDK script loaded');
    try {{
      if (window.chatwootSDK && typeof window.chatwootSDK.run === 'function') {{
        window.chatwootSDK.run({{ websiteToken: {token}, baseUrl: BASE_URL }});
        log('SDK initialized');
      }} else {{
        warn('chatwootSDK not available or missing run method');
      }}
    }} catch (e) {{
      warn('chatwootSDK.run failed:', e);
    }}
  }};
  s.parentNode.insertBefore(g, s);
}})(document, 'script');
</script>
",
        prelude = console.prelude(),
        base_url = escape::js_string(settings.base_url_trimmed()),
        token = escape::js_string(settings.widget_token.trim()),
    )
}

fn visitor_script(console: ConsoleLog, identity: Option<&VisitorIdentity>) -> String {
    let (identify, gap) = match identity {
        Some(id) => (
            format!(
                "\
      try {{
        if (typeof window.$chatwoot.setUser === 'function') {{
          window.$chatwoot.setUser({identifier}, {attributes});
          log('visitor identified');
        }} else {{
          warn('setUser is not available');
        }}
      }} catch (e) {{
        warn('setUser failed:', e);
      }}
",
                identifier = escape::js_string(&id.identifier),
                attributes = escape::js_json(&id.set_user_attributes()),
            ),
            PAGE_CONTEXT_GAP_MS,
        ),
        None => ("      log('anonymous visitor');\n".to_owned(), 0),
    };

    format!(
        "\
<script>
(function () {{
{prelude}{helper}
cwWaitFor(function () {{
  return !!window.$chatwoot;
}}, function () {{
  log('SDK ready');
  setTimeout(function () {{
{identify}      setTimeout(function () {{
        try {{
          if (typeof window.$chatwoot.setCustomAttributes === 'function') {{
            window.$chatwoot.setCustomAttributes({{
              page_url: window.location.href,
              page_title: document.title
            }});
            log('page context sent');
          }}
        }} catch (e) {{
          warn('setCustomAttributes failed:', e);
        }}
      }}, {gap});
  }}, {settle});
}}, function () {{
  warn('SDK did not become ready');
}});
}})();
</script>
",
        prelude = console.prelude(),
        helper = sdk_wait().helper("cwWaitFor"),
        settle = SETTLE_DELAY_MS,
    )
}

/// Render both components for one page with a default cookie scope.
pub fn render_page(
    settings: &WidgetSettings,
    visitor: &VisitorContext,
    customer: Option<&CustomerProfile>,
    dates: &DateStyle,
    cookie_header: Option<&str>,
) -> PageFragments {
    render_page_with(
        &ResetCoordinator::default(),
        settings,
        visitor,
        customer,
        dates,
        cookie_header,
    )
}

/// Render both components for one page.
///
/// The settings value is the snapshot for this render; nothing here reads
/// global state.
pub fn render_page_with(
    reset: &ResetCoordinator,
    settings: &WidgetSettings,
    visitor: &VisitorContext,
    customer: Option<&CustomerProfile>,
    dates: &DateStyle,
    cookie_header: Option<&str>,
) -> PageFragments {
    if !settings.is_configured() {
        TraceEvent::WidgetSkipped {
            reason: "unconfigured".into(),
        }
        .emit();
        return PageFragments::default();
    }

    let outcome = reset.on_render(settings, cookie_header);
    let identity = IdentityAssembler::new(settings, dates).assemble(visitor, customer);
    let footer = render_widget(settings, identity.as_ref());

    TraceEvent::WidgetRendered {
        identified: identity.is_some(),
        enriched: identity
            .as_ref()
            .is_some_and(|id| !id.description.is_empty() || !id.phone_number.is_empty()),
        debug: settings.debug_mode,
    }
    .emit();

    PageFragments {
        head: outcome.script,
        footer,
        set_cookie: outcome.clear_cookie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_domain::settings::{DarkMode, WidgetPosition, WidgetType};

    fn configured() -> WidgetSettings {
        WidgetSettings {
            base_url: "https://chat.example.com/".into(),
            widget_token: "tok123".into(),
            hmac_token: "s3cret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn unconfigured_renders_nothing() {
        assert!(render_widget(&WidgetSettings::default(), None).is_none());
    }

    #[test]
    fn settings_precede_loader() {
        let html = render_widget(&configured(), None).unwrap();
        let settings_at = html.find("window.chatwootSettings").unwrap();
        let loader_at = html.find("/packs/js/sdk.js").unwrap();
        assert!(settings_at < loader_at);
        assert!(html.contains("var BASE_URL = \"https://chat.example.com\";"));
        assert!(html.contains("websiteToken: \"tok123\""));
        assert!(html.contains("g.id = 'chatwoot-sdk';"));
    }

    #[test]
    fn loader_guards_sdk_run() {
        let html = render_widget(&configured(), None).unwrap();
        let guard_at = html
            .find("if (window.chatwootSDK && typeof window.chatwootSDK.run === 'function') {")
            .unwrap();
        let run_at = html.find("window.chatwootSDK.run({").unwrap();
        assert!(guard_at < run_at);
        assert!(html.contains("warn('chatwootSDK.run failed:', e);"));
        // onload is wired before the element can fire it.
        assert!(html.find("g.onload").unwrap() < html.find("s.parentNode.insertBefore").unwrap());
    }

    #[test]
    fn loader_logs_each_step_in_debug_mode() {
        let html = render_widget(
            &WidgetSettings {
                debug_mode: true,
                ..configured()
            },
            None,
        )
        .unwrap();
        let loader_start = html.find("var BASE_URL").unwrap();
        let loader = &html[..html[loader_start..].find("</script>").unwrap() + loader_start];
        assert!(loader.contains("console.log.apply"));
        assert!(loader.contains("log('SDK script loaded');"));
        assert!(loader.contains("log('SDK initialized');"));
        assert!(loader.contains("warn('chatwootSDK not available or missing run method');"));
    }

    #[test]
    fn appearance_settings_are_serialized() {
        let s = WidgetSettings {
            hide_message_bubble: true,
            position: WidgetPosition::Left,
            widget_type: WidgetType::ExpandedBubble,
            dark_mode: DarkMode::Auto,
            locale: "pt_BR".into(),
            ..configured()
        };
        let html = render_widget(&s, None).unwrap();
        assert!(html.contains("\"hideMessageBubble\":true"));
        assert!(html.contains("\"position\":\"left\""));
        assert!(html.contains("\"type\":\"expanded_bubble\""));
        assert!(html.contains("\"darkMode\":\"auto\""));
        assert!(html.contains("\"locale\":\"pt_BR\""));
    }

    #[test]
    fn anonymous_gets_page_context_only() {
        let html = render_widget(&configured(), None).unwrap();
        assert!(!html.contains("setUser("));
        assert!(html.contains("setCustomAttributes"));
        assert!(html.contains("}, 0);"));
    }

    #[test]
    fn identified_visitor_gets_set_user_then_context() {
        let s = configured();
        let dates = DateStyle::default();
        let visitor = VisitorContext::authenticated("7", "a@example.com", "Ana");
        let id = IdentityAssembler::new(&s, &dates).assemble(&visitor, None).unwrap();
        let html = render_widget(&s, Some(&id)).unwrap();

        let user_at = html.find("window.$chatwoot.setUser(\"a@example.com\"").unwrap();
        let ctx_at = html.find("window.$chatwoot.setCustomAttributes({").unwrap();
        assert!(user_at < ctx_at);
        assert!(html.contains("}, 500);"));
        assert!(html.contains("}, 1500);"));
        assert!(html.contains("\"identifier_hash\":\""));
    }

    #[test]
    fn readiness_listens_for_event_and_polls() {
        let html = render_widget(&configured(), None).unwrap();
        assert!(html.contains("var eventName = \"chatwoot:ready\";"));
        assert!(html.contains("setInterval(check, 250)"));
    }

    #[test]
    fn debug_flag_controls_console() {
        let quiet = render_widget(&configured(), None).unwrap();
        assert!(!quiet.contains("console."));
        let loud = render_widget(
            &WidgetSettings {
                debug_mode: true,
                ..configured()
            },
            None,
        )
        .unwrap();
        assert!(loud.contains("console.log"));
    }

    #[test]
    fn page_places_reset_in_head() {
        let s = configured();
        let page = render_page(
            &s,
            &VisitorContext::Anonymous,
            None,
            &DateStyle::default(),
            Some("chatwoot_reset_needed=1"),
        );
        assert!(page.head.unwrap().contains("$chatwoot.reset()"));
        assert!(page.set_cookie.unwrap().contains("Max-Age=0"));
        assert!(page.footer.is_some());
    }

    #[test]
    fn unconfigured_page_is_empty() {
        let page = render_page(
            &WidgetSettings::default(),
            &VisitorContext::Anonymous,
            None,
            &DateStyle::default(),
            Some("chatwoot_reset_needed=1"),
        );
        assert!(page.is_empty());
    }
}
