use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::settings::WidgetSettings;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chatwoot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatwootConfig {
    /// Where the admin form persists the option set.  When the file exists
    /// it wins over `[chatwoot.widget]`.
    #[serde(default = "d_settings_path")]
    pub settings_path: PathBuf,
    /// Environment variable that, when set and non-empty, overrides the
    /// shared HMAC secret so it can stay out of config files.
    #[serde(default = "d_hmac_token_env")]
    pub hmac_token_env: String,
    /// Initial option values used until the admin form saves.
    #[serde(default)]
    pub widget: WidgetSettings,
}

impl Default for ChatwootConfig {
    fn default() -> Self {
        Self {
            settings_path: d_settings_path(),
            hmac_token_env: d_hmac_token_env(),
            widget: WidgetSettings::default(),
        }
    }
}

fn d_settings_path() -> PathBuf {
    PathBuf::from("./data/chatwoot-settings.json")
}

fn d_hmac_token_env() -> String {
    "CW_HMAC_TOKEN".into()
}
