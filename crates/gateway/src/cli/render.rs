//! `render`: print what a page view would receive, without a server.

use std::sync::Arc;

use cw_domain::config::Config;
use cw_domain::visitor::VisitorContext;
use cw_widget::reset::{MARKER_COOKIE, MARKER_VALUE};

use crate::bootstrap::build_app_state;
use crate::render::page_fragments;

pub async fn run(
    config: Config,
    email: Option<String>,
    name: Option<String>,
    id: String,
    reset_pending: bool,
) -> anyhow::Result<()> {
    let state = build_app_state(Arc::new(config))?;

    let visitor = match email {
        Some(email) => {
            let name = name.unwrap_or_else(|| email.clone());
            VisitorContext::authenticated(id, email, name)
        }
        None => VisitorContext::Anonymous,
    };
    let cookie = reset_pending.then(|| format!("{MARKER_COOKIE}={MARKER_VALUE}"));

    let fragments = page_fragments(&state, &visitor, cookie.as_deref()).await;
    if fragments.is_empty() {
        eprintln!("widget is not configured; nothing would be injected");
        return Ok(());
    }
    if let Some(head) = fragments.head {
        println!("<!-- head -->\n{head}");
    }
    if let Some(footer) = fragments.footer {
        println!("<!-- footer -->\n{footer}");
    }
    if let Some(cookie) = fragments.set_cookie {
        println!("<!-- Set-Cookie: {cookie} -->");
    }
    Ok(())
}
