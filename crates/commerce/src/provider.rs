//! The `ProfileLookup` trait defines the interface for all customer
//! profile sources (WooCommerce, static file, none, test doubles).

use async_trait::async_trait;
use cw_domain::error::Result;
use cw_domain::visitor::CustomerProfile;

/// Read-only access to the e-commerce system's customer records.
///
/// `Ok(None)` means the store has no customer for this visitor; `Err` means
/// the store could not be asked.  Callers treat both as "no enrichment".
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Customer record for the site-side visitor id.
    async fn customer_profile(&self, visitor_id: &str) -> Result<Option<CustomerProfile>>;

    /// Short name used in logs and trace events.
    fn source(&self) -> &'static str;
}

/// The site has no e-commerce system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiles;

#[async_trait]
impl ProfileLookup for NoProfiles {
    async fn customer_profile(&self, _visitor_id: &str) -> Result<Option<CustomerProfile>> {
        Ok(None)
    }

    fn source(&self) -> &'static str {
        "none"
    }
}
