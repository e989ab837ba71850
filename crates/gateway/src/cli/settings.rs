//! `settings list|get|set`: the admin form's options from the shell.

use cw_domain::config::Config;
use cw_domain::settings::{OPTION_NAMES, OPT_HMAC_TOKEN};

use crate::bootstrap::open_settings;

pub fn list(config: &Config) -> anyhow::Result<()> {
    let store = open_settings(config)?;
    let effective = store.snapshot().redacted();
    for option in OPTION_NAMES {
        let value = effective.get(option).unwrap_or_default();
        println!("{option} = {value}");
    }
    if store.hmac_pinned() {
        println!(
            "\n{OPT_HMAC_TOKEN} is pinned by ${}",
            config.chatwoot.hmac_token_env
        );
    }
    Ok(())
}

pub fn get(config: &Config, option: &str) -> anyhow::Result<()> {
    let store = open_settings(config)?;
    let effective = store.snapshot();
    // The secret is never echoed; use `sign --verify` to check it.
    let effective = if option == OPT_HMAC_TOKEN {
        effective.redacted()
    } else {
        effective
    };
    match effective.get(option) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => anyhow::bail!(
            "unknown option {option:?}; expected one of: {}",
            OPTION_NAMES.join(", ")
        ),
    }
}

pub fn set(config: &Config, option: &str, value: &str) -> anyhow::Result<()> {
    let store = open_settings(config)?;
    let changed = store.set_option(option, value)?;
    if changed.is_empty() {
        println!("{option}: unchanged");
    } else {
        println!(
            "{option}: saved to {}",
            store.persist_path().display()
        );
    }
    if option == OPT_HMAC_TOKEN && store.hmac_pinned() {
        eprintln!(
            "note: ${} overrides the stored secret at runtime",
            config.chatwoot.hmac_token_env
        );
    }
    Ok(())
}
