//! `GET /v1/widget`: fragments for backends that render their own pages.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::inject::cookie_header;
use crate::render;
use crate::state::AppState;
use crate::visitor::visitor_from_headers;

#[derive(Debug, Serialize)]
pub struct WidgetFragments {
    /// Insert before `</head>`; present only when a session reset is due.
    pub head: Option<String>,
    /// Insert before `</body>`; absent while the widget is unconfigured.
    pub footer: Option<String>,
}

pub async fn widget(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visitor = visitor_from_headers(&state.config.site, &headers);
    let cookies = cookie_header(&headers);
    let fragments = render::page_fragments(&state, &visitor, cookies.as_deref()).await;

    let mut resp = Json(WidgetFragments {
        head: fragments.head,
        footer: fragments.footer,
    })
    .into_response();
    let out = resp.headers_mut();
    out.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    if let Some(cookie) = fragments
        .set_cookie
        .as_deref()
        .and_then(|c| HeaderValue::from_str(c).ok())
    {
        out.append(header::SET_COOKIE, cookie);
    }
    resp
}
