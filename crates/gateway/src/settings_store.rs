//! Settings store: the widget options the admin form edits.
//!
//! Effective settings are layered, later layers winning:
//!
//! 1. `[chatwoot.widget]` in `config.toml` (seed),
//! 2. the persisted settings file (`chatwoot.settings_path`), a flat JSON
//!    object of option name to string value,
//! 3. the HMAC secret from the env var named by `chatwoot.hmac_token_env`.
//!
//! Renders take a [`snapshot`](SettingsStore::snapshot) and never hold the
//! lock.  Saves rewrite the whole file via tmp + rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cw_domain::config::ChatwootConfig;
use cw_domain::error::{Error, Result};
use cw_domain::settings::{WidgetSettings, OPTION_NAMES, OPT_HMAC_TOKEN};
use cw_domain::trace::TraceEvent;
use parking_lot::RwLock;

pub struct SettingsStore {
    /// Seed + file layers; what gets persisted.
    stored: RwLock<WidgetSettings>,
    persist_path: PathBuf,
    /// Secret pinned by the environment, if any.
    hmac_override: Option<String>,
}

impl SettingsStore {
    /// Build the store from config, reading the env override and the
    /// persisted file.  A missing file is not an error.
    pub fn open(cfg: &ChatwootConfig) -> Result<Self> {
        let hmac_override = std::env::var(&cfg.hmac_token_env)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());
        if hmac_override.is_some() {
            tracing::info!(env = %cfg.hmac_token_env, "HMAC secret pinned by environment");
        }
        Self::with_override(cfg.widget.clone(), &cfg.settings_path, hmac_override)
    }

    pub fn with_override(
        seed: WidgetSettings,
        persist_path: &Path,
        hmac_override: Option<String>,
    ) -> Result<Self> {
        let mut stored = seed;
        match std::fs::read_to_string(persist_path) {
            Ok(raw) => {
                let file: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
                    Error::Settings(format!("{}: {e}", persist_path.display()))
                })?;
                apply_file(&mut stored, &file);
                tracing::info!(path = %persist_path.display(), "widget settings loaded");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %persist_path.display(), "no persisted widget settings");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            stored: RwLock::new(stored),
            persist_path: persist_path.to_owned(),
            hmac_override,
        })
    }

    /// Effective settings for one render.
    pub fn snapshot(&self) -> WidgetSettings {
        let mut s = self.stored.read().clone();
        if let Some(ref secret) = self.hmac_override {
            s.hmac_token = secret.clone();
        }
        s
    }

    /// Settings as persisted, without the env override.
    pub fn stored(&self) -> WidgetSettings {
        self.stored.read().clone()
    }

    pub fn hmac_pinned(&self) -> bool {
        self.hmac_override.is_some()
    }

    pub fn persist_path(&self) -> &Path {
        &self.persist_path
    }

    /// Replace the stored settings and persist them.  Returns the option
    /// names whose value changed.
    pub fn update(&self, next: WidgetSettings) -> Result<Vec<String>> {
        let mut guard = self.stored.write();
        let changed: Vec<String> = OPTION_NAMES
            .iter()
            .filter(|opt| guard.get(opt) != next.get(opt))
            .map(|opt| (*opt).to_owned())
            .collect();
        if changed.is_empty() {
            return Ok(changed);
        }

        write_file(&self.persist_path, &next)?;
        *guard = next;
        drop(guard);

        TraceEvent::SettingsSaved {
            changed: changed.clone(),
        }
        .emit();
        Ok(changed)
    }

    /// Set one option by name and persist.
    pub fn set_option(&self, option: &str, value: &str) -> Result<Vec<String>> {
        let mut next = self.stored();
        next.set(option, value)?;
        self.update(next)
    }
}

fn apply_file(settings: &mut WidgetSettings, file: &BTreeMap<String, String>) {
    for (option, value) in file {
        if let Err(e) = settings.set(option, value) {
            tracing::warn!(option = %option, error = %e, "ignoring persisted setting");
        }
    }
}

fn write_file(path: &Path, settings: &WidgetSettings) -> Result<()> {
    let map: BTreeMap<&str, String> = OPTION_NAMES
        .iter()
        .filter_map(|opt| settings.get(opt).map(|v| (*opt, v)))
        .collect();
    let json = serde_json::to_string_pretty(&map)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    if let Err(e) = std::fs::write(&tmp, json) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    std::fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), secret_set = map.get(OPT_HMAC_TOKEN).is_some_and(|s| !s.is_empty()), "widget settings written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_domain::settings::{WidgetPosition, OPT_BASE_URL, OPT_WIDGET_POSITION};

    fn seed() -> WidgetSettings {
        WidgetSettings {
            base_url: "https://seed.example.com".into(),
            widget_token: "seed-token".into(),
            ..Default::default()
        }
    }

    #[test]
    fn seed_applies_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            SettingsStore::with_override(seed(), &dir.path().join("s.json"), None).unwrap();
        assert_eq!(store.snapshot().base_url, "https://seed.example.com");
    }

    #[test]
    fn file_overrides_seed_and_env_overrides_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(
            &path,
            r#"{ "chatwoot_base_url": "https://file.example.com", "chatwoot_hmac_token": "from-file" }"#,
        )
        .unwrap();

        let store = SettingsStore::with_override(seed(), &path, Some("from-env".into())).unwrap();
        let s = store.snapshot();
        assert_eq!(s.base_url, "https://file.example.com");
        assert_eq!(s.widget_token, "seed-token");
        assert_eq!(s.hmac_token, "from-env");
        assert_eq!(store.stored().hmac_token, "from-file");
        assert!(store.hmac_pinned());
    }

    #[test]
    fn bad_persisted_values_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(
            &path,
            r#"{ "chatwoot_widget_position": "middle", "chatwoot_unknown": "x", "chatwoot_debug_mode": "1" }"#,
        )
        .unwrap();
        let store = SettingsStore::with_override(seed(), &path, None).unwrap();
        let s = store.snapshot();
        assert_eq!(s.position, WidgetPosition::Right);
        assert!(s.debug_mode);
    }

    #[test]
    fn update_persists_and_reports_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("s.json");
        let store = SettingsStore::with_override(seed(), &path, None).unwrap();

        let changed = store.set_option(OPT_WIDGET_POSITION, "left").unwrap();
        assert_eq!(changed, vec![OPT_WIDGET_POSITION.to_owned()]);
        assert!(store.set_option(OPT_WIDGET_POSITION, "left").unwrap().is_empty());

        let reopened = SettingsStore::with_override(WidgetSettings::default(), &path, None).unwrap();
        let s = reopened.snapshot();
        assert_eq!(s.position, WidgetPosition::Left);
        assert_eq!(s.base_url, "https://seed.example.com");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn invalid_set_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            SettingsStore::with_override(seed(), &dir.path().join("s.json"), None).unwrap();
        assert!(store.set_option(OPT_WIDGET_POSITION, "middle").is_err());
        assert!(store.set_option("nope", "x").is_err());
        assert_eq!(store.snapshot().get(OPT_BASE_URL).unwrap(), "https://seed.example.com");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SettingsStore::with_override(seed(), &path, None).is_err());
    }
}
