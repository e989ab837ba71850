//! `GET|POST /admin/chatwoot`: the widget settings form.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use cw_domain::settings::{
    DarkMode, WidgetPosition, WidgetSettings, WidgetType, OPTION_NAMES, OPT_BASE_URL,
    OPT_DARK_MODE, OPT_DEBUG_MODE, OPT_HIDE_MESSAGE_BUBBLE, OPT_HMAC_TOKEN,
    OPT_SHOW_UNREAD_DIALOG, OPT_USE_BROWSER_LANGUAGE, OPT_WIDGET_LOCALE, OPT_WIDGET_POSITION,
    OPT_WIDGET_TOKEN, OPT_WIDGET_TYPE,
};
use cw_widget::escape::{html_attr, html_text};

use crate::state::AppState;

use super::guard::AdminGuard;

/// Checkbox that clears the stored secret (the password field is never
/// pre-filled, so leaving it empty keeps the current value).
const CLEAR_SECRET: &str = "chatwoot_hmac_token_clear";

const BOOL_OPTIONS: &[&str] = &[
    OPT_USE_BROWSER_LANGUAGE,
    OPT_HIDE_MESSAGE_BUBBLE,
    OPT_SHOW_UNREAD_DIALOG,
    OPT_DEBUG_MODE,
];

enum Notice {
    Saved(usize),
    Error(String),
}

pub async fn show(_guard: AdminGuard, State(state): State<AppState>) -> Html<String> {
    Html(render(&state, &state.settings.stored(), None))
}

pub async fn save(
    _guard: AdminGuard,
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !same_origin(&headers) {
        return (StatusCode::FORBIDDEN, "cross-origin form submission").into_response();
    }

    let current = state.settings.stored();
    let next = match apply_form(&current, &form) {
        Ok(next) => next,
        Err(msg) => {
            let page = render(&state, &current, Some(Notice::Error(msg)));
            return (StatusCode::BAD_REQUEST, Html(page)).into_response();
        }
    };

    match state.settings.update(next) {
        Ok(changed) => {
            tracing::info!(changed = ?changed, "widget settings saved from admin form");
            let page = render(&state, &state.settings.stored(), Some(Notice::Saved(changed.len())));
            Html(page).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to persist widget settings");
            let page = render(&state, &current, Some(Notice::Error(format!("could not save: {e}"))));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
        }
    }
}

/// Build the next settings value from a submitted form.
pub(crate) fn apply_form(
    current: &WidgetSettings,
    form: &HashMap<String, String>,
) -> Result<WidgetSettings, String> {
    let mut next = current.clone();
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or("");

    for option in OPTION_NAMES {
        let value = match *option {
            OPT_HMAC_TOKEN => {
                if is_checked(field(CLEAR_SECRET)) {
                    ""
                } else if field(OPT_HMAC_TOKEN).trim().is_empty() {
                    continue;
                } else {
                    field(OPT_HMAC_TOKEN)
                }
            }
            // Unchecked boxes are simply absent from the submission.
            opt if BOOL_OPTIONS.contains(&opt) => {
                if is_checked(field(opt)) {
                    "true"
                } else {
                    "false"
                }
            }
            opt => match form.get(opt) {
                Some(v) => v.as_str(),
                None => continue,
            },
        };
        next.set(option, value).map_err(|e| e.to_string())?;
    }

    let url = next.base_url.as_str();
    if !url.is_empty()
        && (!(url.starts_with("https://") || url.starts_with("http://"))
            || url.chars().any(char::is_whitespace))
    {
        return Err(format!("{OPT_BASE_URL}: expected an http(s) URL, got {url:?}"));
    }
    Ok(next)
}

fn is_checked(v: &str) -> bool {
    matches!(v.trim(), "1" | "on" | "true" | "yes")
}

/// Reject form posts whose `Origin` names a different host.
fn same_origin(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) else {
        return true;
    };
    let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    origin
        .split_once("://")
        .is_some_and(|(_, rest)| rest.trim_end_matches('/') == host)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Markup
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn render(state: &AppState, s: &WidgetSettings, notice: Option<Notice>) -> String {
    let notice_html = match notice {
        Some(Notice::Saved(0)) => r#"<div class="notice ok">No changes.</div>"#.to_owned(),
        Some(Notice::Saved(n)) => {
            format!(r#"<div class="notice ok">Settings saved ({n} changed).</div>"#)
        }
        Some(Notice::Error(msg)) => {
            format!(r#"<div class="notice err">{}</div>"#, html_text(&msg))
        }
        None => String::new(),
    };

    let status = if s.is_configured() {
        r#"<span class="ok">active</span>"#
    } else {
        r#"<span class="err">inactive: base URL and website token are required</span>"#
    };

    let secret_note = if state.settings.hmac_pinned() {
        format!(
            "Pinned by <code>{}</code>; values entered here are stored but not used.",
            html_text(&state.config.chatwoot.hmac_token_env)
        )
    } else if s.has_identity_secret() {
        "A secret is stored. Leave empty to keep it.".to_owned()
    } else {
        "Empty: visitors chat anonymously.".to_owned()
    };

    let site = &state.config.site;
    let identity_help = if site.trust_identity_headers {
        format!(
            "Signed-in visitors are read from <code>{}</code>, <code>{}</code> and <code>{}</code>.",
            html_text(&site.identity_headers.id),
            html_text(&site.identity_headers.email),
            html_text(&site.identity_headers.name),
        )
    } else {
        "Identity headers are not trusted (<code>site.trust_identity_headers = false</code>); \
         every visitor is anonymous."
            .to_owned()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Chatwoot Widget Settings</title>
<style>
  body {{ font-family: system-ui, sans-serif; max-width: 900px; margin: 2rem auto; padding: 0 1rem; background: #0d1117; color: #c9d1d9; }}
  h1 {{ color: #58a6ff; }}
  h2 {{ color: #79c0ff; border-bottom: 1px solid #21262d; padding-bottom: 0.3em; margin-top: 2em; }}
  .card {{ background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1rem; margin: 0.5rem 0; }}
  label {{ display: block; margin: 0.8em 0 0.2em; }}
  input[type=text], input[type=url], input[type=password], select {{ width: 100%; padding: 0.4em; background: #0d1117; color: #c9d1d9; border: 1px solid #30363d; border-radius: 4px; }}
  .check label {{ display: inline; }}
  .hint {{ color: #8b949e; font-size: 0.9em; }}
  .notice {{ padding: 0.6em 1em; border-radius: 6px; margin: 1em 0; }}
  .notice.ok {{ background: #0f2d1a; border: 1px solid #238636; }}
  .notice.err {{ background: #3d1214; border: 1px solid #da3633; }}
  .ok {{ color: #3fb950; }} .err {{ color: #f85149; }}
  button {{ margin-top: 1.5em; padding: 0.5em 1.5em; background: #238636; color: #fff; border: 0; border-radius: 6px; cursor: pointer; }}
  code {{ background: #21262d; padding: 0.2em 0.4em; border-radius: 3px; font-size: 0.9em; }}
</style>
</head>
<body>
<h1>Chatwoot Widget Settings</h1>
<p>Widget: {status}</p>
{notice_html}
<form method="post" action="/admin/chatwoot">

<h2>Connection</h2>
<div class="card">
  <label for="{OPT_BASE_URL}">Chatwoot URL</label>
  <input type="url" id="{OPT_BASE_URL}" name="{OPT_BASE_URL}" value="{base_url}" placeholder="https://app.chatwoot.com">
  <label for="{OPT_WIDGET_TOKEN}">Website token</label>
  <input type="text" id="{OPT_WIDGET_TOKEN}" name="{OPT_WIDGET_TOKEN}" value="{widget_token}">
  <label for="{OPT_HMAC_TOKEN}">Identity validation secret (HMAC)</label>
  <input type="password" id="{OPT_HMAC_TOKEN}" name="{OPT_HMAC_TOKEN}" value="" autocomplete="off">
  <div class="hint">{secret_note}</div>
  <div class="check"><input type="checkbox" id="{CLEAR_SECRET}" name="{CLEAR_SECRET}" value="1"> <label for="{CLEAR_SECRET}">Clear stored secret</label></div>
</div>

<h2>Widget</h2>
<div class="card">
  <label for="{OPT_WIDGET_POSITION}">Position</label>
  <select id="{OPT_WIDGET_POSITION}" name="{OPT_WIDGET_POSITION}">{position_options}</select>
  <label for="{OPT_WIDGET_TYPE}">Bubble type</label>
  <select id="{OPT_WIDGET_TYPE}" name="{OPT_WIDGET_TYPE}">{type_options}</select>
  <label for="{OPT_DARK_MODE}">Color scheme</label>
  <select id="{OPT_DARK_MODE}" name="{OPT_DARK_MODE}">{dark_options}</select>
  <label for="{OPT_WIDGET_LOCALE}">Locale</label>
  <input type="text" id="{OPT_WIDGET_LOCALE}" name="{OPT_WIDGET_LOCALE}" value="{locale}">
  {use_browser_language}
  {hide_message_bubble}
  {show_unread_dialog}
</div>

<h2>Advanced</h2>
<div class="card">
  {debug_mode}
  <div class="hint">Logs widget steps to the browser console. Never sends data anywhere.</div>
</div>

<button type="submit">Save settings</button>
</form>

<h2>How it works</h2>
<div class="card">
<ol>
  <li>Create a website inbox in Chatwoot and copy its URL and website token above.</li>
  <li>For verified contacts, copy the inbox's identity validation secret into the HMAC field.</li>
  <li>{identity_help}</li>
  <li>Point your sign-out link at <code>/chatwoot/logout?redirect_to=/</code> so the chat session is reset on the next page.</li>
  <li>Backends rendering their own pages can fetch <code>/v1/widget</code> for the head and footer fragments.</li>
</ol>
<p class="hint">Settings file: <code>{settings_path}</code></p>
</div>
</body>
</html>"#,
        base_url = html_attr(&s.base_url),
        widget_token = html_attr(&s.widget_token),
        position_options = options(
            &[(WidgetPosition::Right.as_str(), "Right"), (WidgetPosition::Left.as_str(), "Left")],
            s.position.as_str(),
        ),
        type_options = options(
            &[
                (WidgetType::Standard.as_str(), "Standard"),
                (WidgetType::ExpandedBubble.as_str(), "Expanded bubble"),
            ],
            s.widget_type.as_str(),
        ),
        dark_options = options(
            &[
                (DarkMode::Auto.as_str(), "Follow system"),
                (DarkMode::Light.as_str(), "Light"),
                (DarkMode::Dark.as_str(), "Dark"),
            ],
            s.dark_mode.as_str(),
        ),
        locale = html_attr(&s.locale),
        use_browser_language = checkbox(OPT_USE_BROWSER_LANGUAGE, "Use the browser's language", s.use_browser_language),
        hide_message_bubble = checkbox(OPT_HIDE_MESSAGE_BUBBLE, "Hide the message bubble", s.hide_message_bubble),
        show_unread_dialog = checkbox(OPT_SHOW_UNREAD_DIALOG, "Show unread messages dialog", s.show_unread_dialog),
        debug_mode = checkbox(OPT_DEBUG_MODE, "Debug mode", s.debug_mode),
        settings_path = html_text(&state.settings.persist_path().display().to_string()),
    )
}

fn options(choices: &[(&str, &str)], selected: &str) -> String {
    choices
        .iter()
        .map(|(value, label)| {
            let sel = if *value == selected { " selected" } else { "" };
            format!(r#"<option value="{}"{sel}>{}</option>"#, html_attr(value), html_text(label))
        })
        .collect()
}

fn checkbox(name: &str, label: &str, checked: bool) -> String {
    let checked = if checked { " checked" } else { "" };
    format!(
        r#"<div class="check"><input type="checkbox" id="{name}" name="{name}" value="1"{checked}> <label for="{name}">{}</label></div>"#,
        html_text(label)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).into(), (*v).into())).collect()
    }

    fn current() -> WidgetSettings {
        WidgetSettings {
            base_url: "https://chat.example.com".into(),
            widget_token: "tok".into(),
            hmac_token: "old-secret".into(),
            use_browser_language: true,
            ..Default::default()
        }
    }

    #[test]
    fn empty_secret_field_keeps_secret() {
        let next = apply_form(
            &current(),
            &form(&[
                (OPT_BASE_URL, "https://chat.example.com"),
                (OPT_WIDGET_TOKEN, "tok2"),
                (OPT_WIDGET_POSITION, "left"),
            ]),
        )
        .unwrap();
        assert_eq!(next.hmac_token, "old-secret");
        assert_eq!(next.widget_token, "tok2");
        assert_eq!(next.position, WidgetPosition::Left);
    }

    #[test]
    fn unchecked_boxes_turn_off() {
        let next = apply_form(&current(), &form(&[(OPT_BASE_URL, "https://x.test")])).unwrap();
        assert!(!next.use_browser_language);
        let next = apply_form(
            &current(),
            &form(&[(OPT_DEBUG_MODE, "1"), (OPT_USE_BROWSER_LANGUAGE, "1")]),
        )
        .unwrap();
        assert!(next.debug_mode);
        assert!(next.use_browser_language);
    }

    #[test]
    fn clear_checkbox_removes_secret() {
        let next = apply_form(&current(), &form(&[(CLEAR_SECRET, "1"), (OPT_HMAC_TOKEN, "ignored")]))
            .unwrap();
        assert!(next.hmac_token.is_empty());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(apply_form(&current(), &form(&[(OPT_WIDGET_TYPE, "huge")])).is_err());
        assert!(apply_form(&current(), &form(&[(OPT_BASE_URL, "javascript:alert(1)")])).is_err());
        assert!(apply_form(&current(), &form(&[(OPT_BASE_URL, "https://a b")])).is_err());
    }

    #[test]
    fn origin_must_match_host() {
        let mut h = HeaderMap::new();
        assert!(same_origin(&h));
        h.insert(header::HOST, "shop.example.com".parse().unwrap());
        h.insert(header::ORIGIN, "https://shop.example.com".parse().unwrap());
        assert!(same_origin(&h));
        h.insert(header::ORIGIN, "https://evil.example".parse().unwrap());
        assert!(!same_origin(&h));
    }

    #[test]
    fn checkbox_markup() {
        assert!(checkbox(OPT_DEBUG_MODE, "Debug", true).contains(" checked>"));
        assert!(!checkbox(OPT_DEBUG_MODE, "Debug", false).contains("checked"));
    }
}
