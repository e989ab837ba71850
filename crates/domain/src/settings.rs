//! Widget options edited through the admin form.
//!
//! Each field has a stable option name (`chatwoot_*`) used by the settings
//! form and the `settings get/set` CLI, plus a documented default.  The
//! renderers only ever read a snapshot of this struct.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Option names
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const OPT_BASE_URL: &str = "chatwoot_base_url";
pub const OPT_WIDGET_TOKEN: &str = "chatwoot_widget_token";
pub const OPT_HMAC_TOKEN: &str = "chatwoot_hmac_token";
pub const OPT_DEBUG_MODE: &str = "chatwoot_debug_mode";
pub const OPT_HIDE_MESSAGE_BUBBLE: &str = "chatwoot_hide_message_bubble";
pub const OPT_SHOW_UNREAD_DIALOG: &str = "chatwoot_show_unread_dialog";
pub const OPT_WIDGET_POSITION: &str = "chatwoot_widget_position";
pub const OPT_WIDGET_LOCALE: &str = "chatwoot_widget_locale";
pub const OPT_USE_BROWSER_LANGUAGE: &str = "chatwoot_use_browser_language";
pub const OPT_WIDGET_TYPE: &str = "chatwoot_widget_type";
pub const OPT_DARK_MODE: &str = "chatwoot_dark_mode";

/// Every option name, in form order.
pub const OPTION_NAMES: &[&str] = &[
    OPT_BASE_URL,
    OPT_WIDGET_TOKEN,
    OPT_HMAC_TOKEN,
    OPT_WIDGET_POSITION,
    OPT_WIDGET_LOCALE,
    OPT_USE_BROWSER_LANGUAGE,
    OPT_WIDGET_TYPE,
    OPT_DARK_MODE,
    OPT_HIDE_MESSAGE_BUBBLE,
    OPT_SHOW_UNREAD_DIALOG,
    OPT_DEBUG_MODE,
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Appearance enums
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPosition {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    #[default]
    Standard,
    ExpandedBubble,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DarkMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl WidgetPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::ExpandedBubble => "expanded_bubble",
        }
    }
}

impl DarkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for WidgetPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(Error::Settings(format!(
                "invalid widget position {other:?} (expected left or right)"
            ))),
        }
    }
}

impl FromStr for WidgetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "standard" => Ok(Self::Standard),
            "expanded_bubble" => Ok(Self::ExpandedBubble),
            other => Err(Error::Settings(format!(
                "invalid widget type {other:?} (expected standard or expanded_bubble)"
            ))),
        }
    }
}

impl FromStr for DarkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(Error::Settings(format!(
                "invalid dark mode {other:?} (expected auto, light or dark)"
            ))),
        }
    }
}

impl fmt::Display for WidgetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DarkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WidgetSettings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Chatwoot instance URL, e.g. `https://app.chatwoot.com`.
    #[serde(default)]
    pub base_url: String,
    /// Website token of the inbox.
    #[serde(default)]
    pub widget_token: String,
    /// Shared HMAC secret for identity validation.  Empty = anonymous mode.
    #[serde(default)]
    pub hmac_token: String,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub hide_message_bubble: bool,
    #[serde(default)]
    pub show_unread_dialog: bool,
    #[serde(default)]
    pub position: WidgetPosition,
    #[serde(default = "d_locale")]
    pub locale: String,
    #[serde(default = "d_true")]
    pub use_browser_language: bool,
    #[serde(default)]
    pub widget_type: WidgetType,
    #[serde(default)]
    pub dark_mode: DarkMode,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            widget_token: String::new(),
            hmac_token: String::new(),
            debug_mode: false,
            hide_message_bubble: false,
            show_unread_dialog: false,
            position: WidgetPosition::Right,
            locale: d_locale(),
            use_browser_language: true,
            widget_type: WidgetType::Standard,
            dark_mode: DarkMode::Auto,
        }
    }
}

// Keeps the secret out of logs and `{:?}` dumps.
impl fmt::Debug for WidgetSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetSettings")
            .field("base_url", &self.base_url)
            .field("widget_token", &self.widget_token)
            .field("hmac_token", &mask(&self.hmac_token))
            .field("debug_mode", &self.debug_mode)
            .field("hide_message_bubble", &self.hide_message_bubble)
            .field("show_unread_dialog", &self.show_unread_dialog)
            .field("position", &self.position)
            .field("locale", &self.locale)
            .field("use_browser_language", &self.use_browser_language)
            .field("widget_type", &self.widget_type)
            .field("dark_mode", &self.dark_mode)
            .finish()
    }
}

impl WidgetSettings {
    /// Base URL and widget token are both present.  Nothing renders otherwise.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.widget_token.trim().is_empty()
    }

    /// A shared secret is configured, so visitors may be identified.
    pub fn has_identity_secret(&self) -> bool {
        !self.hmac_token.is_empty()
    }

    /// Base URL without trailing slashes, ready for path concatenation.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Copy with the HMAC secret masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            hmac_token: mask(&self.hmac_token),
            ..self.clone()
        }
    }

    /// String form of one option, or `None` for an unknown option name.
    pub fn get(&self, option: &str) -> Option<String> {
        let value = match option {
            OPT_BASE_URL => self.base_url.clone(),
            OPT_WIDGET_TOKEN => self.widget_token.clone(),
            OPT_HMAC_TOKEN => self.hmac_token.clone(),
            OPT_DEBUG_MODE => bool_str(self.debug_mode),
            OPT_HIDE_MESSAGE_BUBBLE => bool_str(self.hide_message_bubble),
            OPT_SHOW_UNREAD_DIALOG => bool_str(self.show_unread_dialog),
            OPT_WIDGET_POSITION => self.position.as_str().to_owned(),
            OPT_WIDGET_LOCALE => self.locale.clone(),
            OPT_USE_BROWSER_LANGUAGE => bool_str(self.use_browser_language),
            OPT_WIDGET_TYPE => self.widget_type.as_str().to_owned(),
            OPT_DARK_MODE => self.dark_mode.as_str().to_owned(),
            _ => return None,
        };
        Some(value)
    }

    /// Parse and store one option.
    ///
    /// Text options are trimmed.  An empty locale falls back to the default.
    pub fn set(&mut self, option: &str, value: &str) -> Result<()> {
        match option {
            OPT_BASE_URL => self.base_url = value.trim().to_owned(),
            OPT_WIDGET_TOKEN => self.widget_token = value.trim().to_owned(),
            OPT_HMAC_TOKEN => self.hmac_token = value.trim().to_owned(),
            OPT_DEBUG_MODE => self.debug_mode = parse_bool(option, value)?,
            OPT_HIDE_MESSAGE_BUBBLE => self.hide_message_bubble = parse_bool(option, value)?,
            OPT_SHOW_UNREAD_DIALOG => self.show_unread_dialog = parse_bool(option, value)?,
            OPT_WIDGET_POSITION => self.position = value.parse()?,
            OPT_WIDGET_LOCALE => {
                let locale = value.trim();
                self.locale = if locale.is_empty() {
                    d_locale()
                } else {
                    locale.to_owned()
                };
            }
            OPT_USE_BROWSER_LANGUAGE => self.use_browser_language = parse_bool(option, value)?,
            OPT_WIDGET_TYPE => self.widget_type = value.parse()?,
            OPT_DARK_MODE => self.dark_mode = value.parse()?,
            other => {
                return Err(Error::Settings(format!("unknown option {other:?}")));
            }
        }
        Ok(())
    }
}

fn parse_bool(option: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" | "" => Ok(false),
        other => Err(Error::Settings(format!(
            "{option}: expected a boolean, got {other:?}"
        ))),
    }
}

fn bool_str(b: bool) -> String {
    if b { "true" } else { "false" }.to_owned()
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".into()
    }
}

fn d_locale() -> String {
    "en".into()
}

fn d_true() -> bool {
    true
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = WidgetSettings::default();
        assert_eq!(s.get(OPT_WIDGET_LOCALE).as_deref(), Some("en"));
        assert_eq!(s.get(OPT_WIDGET_POSITION).as_deref(), Some("right"));
        assert_eq!(s.get(OPT_DARK_MODE).as_deref(), Some("auto"));
        assert_eq!(s.get(OPT_DEBUG_MODE).as_deref(), Some("false"));
        assert_eq!(s.get(OPT_USE_BROWSER_LANGUAGE).as_deref(), Some("true"));
        assert_eq!(s.get(OPT_WIDGET_TYPE).as_deref(), Some("standard"));
        assert!(!s.is_configured());
    }

    #[test]
    fn configured_needs_both_url_and_token() {
        let mut s = WidgetSettings::default();
        s.set(OPT_BASE_URL, "https://chat.example.com").unwrap();
        assert!(!s.is_configured());
        s.set(OPT_WIDGET_TOKEN, "tok").unwrap();
        assert!(s.is_configured());
        s.set(OPT_BASE_URL, "   ").unwrap();
        assert!(!s.is_configured());
    }

    #[test]
    fn set_parses_booleans_and_enums() {
        let mut s = WidgetSettings::default();
        s.set(OPT_DEBUG_MODE, "on").unwrap();
        s.set(OPT_WIDGET_POSITION, "left").unwrap();
        s.set(OPT_WIDGET_TYPE, "expanded_bubble").unwrap();
        s.set(OPT_DARK_MODE, "dark").unwrap();
        s.set(OPT_USE_BROWSER_LANGUAGE, "0").unwrap();
        assert!(s.debug_mode);
        assert_eq!(s.position, WidgetPosition::Left);
        assert_eq!(s.widget_type, WidgetType::ExpandedBubble);
        assert_eq!(s.dark_mode, DarkMode::Dark);
        assert!(!s.use_browser_language);
    }

    #[test]
    fn set_rejects_unknown_and_invalid() {
        let mut s = WidgetSettings::default();
        assert!(s.set("chatwoot_nope", "x").is_err());
        assert!(s.set(OPT_DEBUG_MODE, "maybe").is_err());
        assert!(s.set(OPT_WIDGET_POSITION, "center").is_err());
        assert_eq!(s, WidgetSettings::default());
    }

    #[test]
    fn empty_locale_falls_back_to_default() {
        let mut s = WidgetSettings::default();
        s.set(OPT_WIDGET_LOCALE, "pt_BR").unwrap();
        assert_eq!(s.locale, "pt_BR");
        s.set(OPT_WIDGET_LOCALE, "").unwrap();
        assert_eq!(s.locale, "en");
    }

    #[test]
    fn every_option_name_round_trips_through_get() {
        let s = WidgetSettings::default();
        for name in OPTION_NAMES {
            let value = s.get(name).expect("known option");
            let mut copy = s.clone();
            copy.set(name, &value).unwrap();
            assert_eq!(copy, s, "option {name}");
        }
    }

    #[test]
    fn redacted_and_debug_hide_secret() {
        let mut s = WidgetSettings::default();
        s.set(OPT_HMAC_TOKEN, "s3cret").unwrap();
        assert!(s.has_identity_secret());
        assert_eq!(s.redacted().hmac_token, "********");
        assert!(!format!("{s:?}").contains("s3cret"));
    }

    #[test]
    fn base_url_trimmed_strips_trailing_slash() {
        let mut s = WidgetSettings::default();
        s.set(OPT_BASE_URL, "https://app.chatwoot.com/").unwrap();
        assert_eq!(s.base_url_trimmed(), "https://app.chatwoot.com");
    }
}
