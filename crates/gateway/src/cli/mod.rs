pub mod config;
pub mod render;
pub mod settings;
pub mod sign;

use clap::{Parser, Subcommand};

/// chatwoot-gate: Chatwoot widget injection with identity validation.
#[derive(Debug, Parser)]
#[command(name = "chatwoot-gate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Read or change the widget settings the admin form edits.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Print the identifier hash for an email using the configured secret.
    Sign {
        /// Identifier to sign (the visitor's email).
        email: String,
        /// Check this digest instead of printing one; exits 1 on mismatch.
        #[arg(long)]
        verify: Option<String>,
    },
    /// Print the page fragments a visitor would receive.
    Render {
        /// Render for a signed-in visitor with this email.
        #[arg(long)]
        email: Option<String>,
        /// Display name (defaults to the email).
        #[arg(long)]
        name: Option<String>,
        /// Site-side visitor id, used for the profile lookup.
        #[arg(long, default_value = "0")]
        id: String,
        /// Simulate a pending session reset.
        #[arg(long)]
        reset_pending: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// List every option with its effective value (secret masked).
    List,
    /// Print one option's effective value.
    Get {
        /// Option name, e.g. `chatwoot_base_url`.
        option: String,
    },
    /// Set one option and persist it.
    Set {
        /// Option name, e.g. `chatwoot_widget_position`.
        option: String,
        /// New value.
        value: String,
    },
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `CW_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// [`Config`]: cw_domain::config::Config
pub fn load_config() -> anyhow::Result<(cw_domain::config::Config, String)> {
    let config_path = std::env::var("CW_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path`, falling back to defaults when it does not exist.
pub fn load_config_from(path: &str) -> anyhow::Result<cw_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(cw_domain::config::Config::default());
    }
    let raw =
        std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}
