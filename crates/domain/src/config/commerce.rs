use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Commerce (customer profile enrichment)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    /// No e-commerce system; identities carry no enrichment.
    #[default]
    None,
    /// Static JSON file keyed by visitor id.
    File,
    /// WooCommerce REST API.
    Woocommerce,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    #[serde(default)]
    pub source: ProfileSource,
    /// Upper bound on one profile lookup, retries included.  A page render
    /// never waits longer than this for enrichment.
    #[serde(default = "d_lookup_deadline_ms")]
    pub lookup_deadline_ms: u64,
    #[serde(default)]
    pub file: FileProfilesConfig,
    #[serde(default)]
    pub woocommerce: WooCommerceConfig,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            source: ProfileSource::default(),
            lookup_deadline_ms: d_lookup_deadline_ms(),
            file: FileProfilesConfig::default(),
            woocommerce: WooCommerceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProfilesConfig {
    #[serde(default = "d_profiles_path")]
    pub path: PathBuf,
}

impl Default for FileProfilesConfig {
    fn default() -> Self {
        Self {
            path: d_profiles_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooCommerceConfig {
    /// Shop root URL, e.g. `https://shop.example.com`.
    #[serde(default)]
    pub base_url: String,
    /// Environment variables holding the REST API key pair.
    #[serde(default = "d_key_env")]
    pub consumer_key_env: String,
    #[serde(default = "d_secret_env")]
    pub consumer_secret_env: String,
    /// Per-request timeout.  Lookups run on the render path, keep it short.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "d_max_retries")]
    pub max_retries: u32,
}

impl Default for WooCommerceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            consumer_key_env: d_key_env(),
            consumer_secret_env: d_secret_env(),
            timeout_ms: d_timeout_ms(),
            max_retries: d_max_retries(),
        }
    }
}

fn d_profiles_path() -> PathBuf {
    PathBuf::from("./data/customers.json")
}
fn d_key_env() -> String {
    "WC_CONSUMER_KEY".into()
}
fn d_secret_env() -> String {
    "WC_CONSUMER_SECRET".into()
}
fn d_lookup_deadline_ms() -> u64 {
    1200
}
fn d_timeout_ms() -> u64 {
    1000
}
fn d_max_retries() -> u32 {
    1
}
