//! Visitor authentication context from forward-auth headers.
//!
//! The gateway has no accounts of its own.  When it sits behind an auth
//! proxy, that proxy sets id/email/name headers for signed-in visitors.
//! They are honored only with `site.trust_identity_headers = true`.

use axum::http::HeaderMap;
use cw_domain::config::SiteConfig;
use cw_domain::visitor::VisitorContext;

pub fn visitor_from_headers(site: &SiteConfig, headers: &HeaderMap) -> VisitorContext {
    if !site.trust_identity_headers {
        return VisitorContext::Anonymous;
    }
    let names = &site.identity_headers;
    let (Some(id), Some(email)) = (header(headers, &names.id), header(headers, &names.email))
    else {
        return VisitorContext::Anonymous;
    };
    let name = header(headers, &names.name).unwrap_or_else(|| email.clone());
    VisitorContext::authenticated(id, email, name)
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_owned())
        .filter(|v| !v.is_empty())
}
