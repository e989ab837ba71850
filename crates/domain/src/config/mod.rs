mod chatwoot;
mod commerce;
mod observability;
mod server;
mod site;

pub use chatwoot::*;
pub use commerce::*;
pub use observability::*;
pub use server::*;
pub use site::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chatwoot: ChatwootConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub commerce: CommerceConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Admin
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Environment variable holding the admin token for the settings form.
    /// If the env var is unset, the form is open (dev mode, logged at startup).
    #[serde(default = "d_admin_token_env")]
    pub token_env: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token_env: d_admin_token_env(),
        }
    }
}

fn d_admin_token_env() -> String {
    "CW_ADMIN_TOKEN".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.site.timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "site.timezone".into(),
                message: format!("unknown time zone {:?}", self.site.timezone),
            });
        }

        let bad_date_format = chrono::format::StrftimeItems::new(&self.site.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if bad_date_format {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "site.date_format".into(),
                message: format!(
                    "invalid strftime pattern {:?}; dates fall back to %Y-%m-%d",
                    self.site.date_format
                ),
            });
        }

        if !self.site.cookie_path.starts_with('/') {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "site.cookie_path".into(),
                message: "cookie path must start with '/'".into(),
            });
        }

        // The widget stays silent until both are set, which is legal but
        // usually a mistake outside of first-run setups.
        if !self.chatwoot.widget.is_configured() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "chatwoot.widget".into(),
                message: "base_url or widget_token is empty; widget will not render \
                          until set in the admin form"
                    .into(),
            });
        }

        if self.site.trust_identity_headers {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "site.trust_identity_headers".into(),
                message: "visitor identity is taken from request headers; the gateway \
                          must only be reachable through the auth proxy that sets them"
                    .into(),
            });
        }

        if self.commerce.source != ProfileSource::None && self.commerce.lookup_deadline_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "commerce.lookup_deadline_ms".into(),
                message: "lookup_deadline_ms must be > 0".into(),
            });
        }

        match self.commerce.source {
            ProfileSource::None => {}
            ProfileSource::File => {
                if self.commerce.file.path.as_os_str().is_empty() {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: "commerce.file.path".into(),
                        message: "path must not be empty when source = \"file\"".into(),
                    });
                }
            }
            ProfileSource::Woocommerce => {
                if self.commerce.woocommerce.base_url.is_empty() {
                    errors.push(ConfigError {
                        severity: ConfigSeverity::Error,
                        field: "commerce.woocommerce.base_url".into(),
                        message: "base_url must not be empty when source = \"woocommerce\""
                            .into(),
                    });
                }
            }
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "observability.sample_rate".into(),
                message: "sample_rate must be between 0.0 and 1.0".into(),
            });
        }

        errors
    }
}
