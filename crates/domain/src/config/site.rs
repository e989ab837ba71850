use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Site
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Properties of the site the widget is embedded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory of pages served (and injected) by the gateway.
    #[serde(default = "d_pages_dir")]
    pub pages_dir: PathBuf,
    /// Cookie scope for the reset marker.
    #[serde(default = "d_cookie_path")]
    pub cookie_path: String,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    /// Add `Secure` to the reset marker cookie.
    #[serde(default)]
    pub secure_cookies: bool,
    /// strftime pattern for dates shown in the contact description.
    #[serde(default = "d_date_format")]
    pub date_format: String,
    /// IANA time zone used for those dates.
    #[serde(default = "d_timezone")]
    pub timezone: String,
    /// Read visitor identity from forward-auth headers.  Off by default:
    /// anyone able to reach the gateway directly could forge them.
    #[serde(default)]
    pub trust_identity_headers: bool,
    #[serde(default)]
    pub identity_headers: IdentityHeaders,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            pages_dir: d_pages_dir(),
            cookie_path: d_cookie_path(),
            cookie_domain: None,
            secure_cookies: false,
            date_format: d_date_format(),
            timezone: d_timezone(),
            trust_identity_headers: false,
            identity_headers: IdentityHeaders::default(),
        }
    }
}

/// Header names set by the upstream authentication proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityHeaders {
    #[serde(default = "d_id_header")]
    pub id: String,
    #[serde(default = "d_email_header")]
    pub email: String,
    #[serde(default = "d_name_header")]
    pub name: String,
}

impl Default for IdentityHeaders {
    fn default() -> Self {
        Self {
            id: d_id_header(),
            email: d_email_header(),
            name: d_name_header(),
        }
    }
}

fn d_pages_dir() -> PathBuf {
    PathBuf::from("./public")
}
fn d_cookie_path() -> String {
    "/".into()
}
fn d_date_format() -> String {
    "%B %-d, %Y".into()
}
fn d_timezone() -> String {
    "UTC".into()
}
fn d_id_header() -> String {
    "x-visitor-id".into()
}
fn d_email_header() -> String {
    "x-visitor-email".into()
}
fn d_name_header() -> String {
    "x-visitor-name".into()
}
