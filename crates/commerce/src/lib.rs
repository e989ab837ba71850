//! `cw-commerce`: customer profile lookup for widget enrichment.
//!
//! Provides the [`ProfileLookup`] trait that abstracts over the shop's
//! customer records, with three implementations:
//!
//! | `commerce.source` | Implementation        | Best for                         |
//! |-------------------|-----------------------|----------------------------------|
//! | `none`            | [`NoProfiles`]        | Sites without a shop (default)   |
//! | `file`            | [`FileProfiles`]      | Static exports, local testing    |
//! | `woocommerce`     | [`WooCommerceClient`] | Live WooCommerce stores          |
//!
//! Use [`create_lookup`] to build the configured one.

pub mod file;
pub mod provider;
pub mod woocommerce;

pub use file::FileProfiles;
pub use provider::{NoProfiles, ProfileLookup};
pub use woocommerce::{from_reqwest, OrderStats, WooCommerceClient};

use std::sync::Arc;

use cw_domain::config::{CommerceConfig, ProfileSource};
use cw_domain::error::Result;

/// Create the [`ProfileLookup`] selected by `commerce.source`.
pub fn create_lookup(cfg: &CommerceConfig) -> Result<Arc<dyn ProfileLookup>> {
    match cfg.source {
        ProfileSource::None => Ok(Arc::new(NoProfiles)),
        ProfileSource::File => Ok(Arc::new(FileProfiles::load(&cfg.file.path)?)),
        ProfileSource::Woocommerce => {
            let client = WooCommerceClient::new(&cfg.woocommerce)?;
            tracing::info!(
                base_url = %cfg.woocommerce.base_url,
                timeout_ms = cfg.woocommerce.timeout_ms,
                "using WooCommerce customer profiles"
            );
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_is_none() {
        let lookup = create_lookup(&CommerceConfig::default()).unwrap();
        assert_eq!(lookup.source(), "none");
    }

    #[test]
    fn file_source_loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.json");
        std::fs::write(&path, r#"{"7": {"billing_country": "PT"}}"#).unwrap();

        let mut cfg = CommerceConfig::default();
        cfg.source = ProfileSource::File;
        cfg.file.path = path;
        assert_eq!(create_lookup(&cfg).unwrap().source(), "file");
    }

    #[test]
    fn woocommerce_without_credentials_fails() {
        let mut cfg = CommerceConfig::default();
        cfg.source = ProfileSource::Woocommerce;
        cfg.woocommerce.base_url = "https://shop.example.com".into();
        cfg.woocommerce.consumer_key_env = "CW_TEST_UNSET_WC_KEY_0193".into();
        assert!(create_lookup(&cfg).is_err());
    }
}
