//! HTML injection middleware.
//!
//! Wraps the page service: every successful `text/html` response gets the
//! reset script before `</head>`, the widget scripts before `</body>`, and
//! the marker-clearing cookie.  Other responses pass through untouched.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cw_domain::trace::TraceEvent;
use cw_widget::PageFragments;

use crate::render;
use crate::state::AppState;
use crate::visitor::visitor_from_headers;

pub async fn inject_widget(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let visitor = visitor_from_headers(&state.config.site, req.headers());
    let cookie_header = cookie_header(req.headers());
    let is_head = req.method() == Method::HEAD;
    let path = req.uri().path().to_owned();

    let resp = next.run(req).await;
    if is_head || !is_injectable(&resp) {
        return resp;
    }

    let limit = state.config.server.max_html_bytes;
    let declared_len = resp
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|n| n > limit) {
        tracing::debug!(path = %path, "page larger than max_html_bytes, not injected");
        return resp;
    }

    let fragments = render::page_fragments(&state, &visitor, cookie_header.as_deref()).await;
    if fragments.is_empty() {
        return resp;
    }

    let (mut parts, body) = resp.into_parts();
    let bytes = match to_bytes(body, limit).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "failed to buffer page body");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };
    let html = match String::from_utf8(bytes.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            tracing::debug!(path = %path, "page is not UTF-8, not injected");
            return Response::from_parts(parts, Body::from(bytes));
        }
    };

    if fragments.head.is_some() {
        TraceEvent::ResetDelivered { path: path.clone() }.emit();
    }
    let out = splice(&html, &fragments);

    let headers = &mut parts.headers;
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::ETAG);
    headers.remove(header::LAST_MODIFIED);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-cache"));
    if let Some(cookie) = fragments
        .set_cookie
        .as_deref()
        .and_then(|c| HeaderValue::from_str(c).ok())
    {
        headers.append(header::SET_COOKIE, cookie);
    }

    Response::from_parts(parts, Body::from(out))
}

fn is_injectable(resp: &Response) -> bool {
    if !resp.status().is_success() {
        return false;
    }
    let headers = resp.headers();
    // Encoded bodies would need decompressing first.
    if headers.contains_key(header::CONTENT_ENCODING) {
        return false;
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
}

pub(crate) fn cookie_header(headers: &axum::http::HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    (!joined.is_empty()).then_some(joined)
}

/// Insert fragments into a page: head before the first `</head>`, footer
/// before the last `</body>` (appended when there is none).
pub fn splice(html: &str, fragments: &PageFragments) -> String {
    let extra = fragments.head.as_ref().map_or(0, String::len)
        + fragments.footer.as_ref().map_or(0, String::len);
    let mut out = String::with_capacity(html.len() + extra);

    let lower = html.to_ascii_lowercase();
    let head_at = fragments
        .head
        .as_ref()
        .and_then(|_| lower.find("</head>"));
    let body_at = fragments
        .footer
        .as_ref()
        .and_then(|_| lower.rfind("</body>"));

    let mut cursor = 0;
    if let (Some(at), Some(head)) = (head_at, fragments.head.as_ref()) {
        out.push_str(&html[..at]);
        out.push_str(head);
        cursor = at;
    }
    match (body_at, fragments.footer.as_ref()) {
        (Some(at), Some(footer)) if at >= cursor => {
            out.push_str(&html[cursor..at]);
            out.push_str(footer);
            out.push_str(&html[at..]);
        }
        (_, Some(footer)) => {
            out.push_str(&html[cursor..]);
            out.push_str(footer);
        }
        (_, None) => out.push_str(&html[cursor..]),
    }

    // No `</head>`: the reset still has to run.
    if head_at.is_none() {
        if let Some(head) = fragments.head.as_ref() {
            out.push_str(head);
        }
    }
    out
}
