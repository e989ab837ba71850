use cw_domain::config::{Config, ConfigSeverity, ProfileSource};
use cw_domain::settings::{DarkMode, WidgetPosition};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn empty_file_parses_to_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.server.port, 8088);
    assert_eq!(config.chatwoot.hmac_token_env, "CW_HMAC_TOKEN");
    assert_eq!(config.commerce.source, ProfileSource::None);
    assert_eq!(config.commerce.lookup_deadline_ms, 1200);
    assert_eq!(config.site.cookie_path, "/");
    assert!(!config.site.trust_identity_headers);
    assert_eq!(config.admin.token_env, "CW_ADMIN_TOKEN");
}

#[test]
fn widget_section_seeds_settings() {
    let toml_str = r#"
[chatwoot.widget]
base_url = "https://app.chatwoot.com"
widget_token = "abc123"
position = "left"
dark_mode = "dark"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let w = &config.chatwoot.widget;
    assert!(w.is_configured());
    assert_eq!(w.position, WidgetPosition::Left);
    assert_eq!(w.dark_mode, DarkMode::Dark);
    assert_eq!(w.locale, "en");
    assert!(w.use_browser_language);
}

#[test]
fn default_config_only_warns() {
    let issues = Config::default().validate();
    assert!(issues.iter().all(|i| i.severity == ConfigSeverity::Warning));
    assert!(issues.iter().any(|i| i.field == "chatwoot.widget"));
}

#[test]
fn bad_timezone_is_an_error() {
    let toml_str = r#"
[site]
timezone = "Mars/Olympus_Mons"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "site.timezone" && i.severity == ConfigSeverity::Error));
}

#[test]
fn woocommerce_source_requires_base_url() {
    let toml_str = r#"
[commerce]
source = "woocommerce"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "commerce.woocommerce.base_url"
            && i.severity == ConfigSeverity::Error));
}

#[test]
fn trusted_identity_headers_warn() {
    let toml_str = r#"
[site]
trust_identity_headers = true

[site.identity_headers]
email = "x-auth-email"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.site.identity_headers.email, "x-auth-email");
    assert_eq!(config.site.identity_headers.id, "x-visitor-id");
    assert!(config
        .validate()
        .iter()
        .any(|i| i.field == "site.trust_identity_headers"));
}

#[test]
fn zero_lookup_deadline_is_rejected() {
    let toml_str = r#"
[commerce]
source = "file"
lookup_deadline_ms = 0
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(config
        .validate()
        .iter()
        .any(|i| i.field == "commerce.lookup_deadline_ms" && i.severity == ConfigSeverity::Error));
}
