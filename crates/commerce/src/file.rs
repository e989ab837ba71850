//! Customer profiles from a static JSON file.
//!
//! The file maps visitor id to profile:
//!
//! ```json
//! {
//!   "7": {
//!     "billing_phone": "+351 910 000 000",
//!     "billing_country": "PT",
//!     "order_count": 3,
//!     "total_spent": 149.5,
//!     "date_created": "2023-02-07T10:00:00Z"
//!   }
//! }
//! ```
//!
//! It is read once at startup; edits need a restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cw_domain::error::{Error, Result};
use cw_domain::visitor::CustomerProfile;

use crate::provider::ProfileLookup;

#[derive(Debug, Clone, Default)]
pub struct FileProfiles {
    path: PathBuf,
    profiles: HashMap<String, CustomerProfile>,
}

impl FileProfiles {
    /// Load the profile map.  A missing file yields an empty map.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "customer profile file not found, starting empty");
                return Ok(Self {
                    path: path.to_owned(),
                    profiles: HashMap::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let profiles: HashMap<String, CustomerProfile> =
            serde_json::from_str(&raw).map_err(|e| Error::Commerce {
                source_name: "file".into(),
                message: format!("{}: {e}", path.display()),
            })?;

        tracing::info!(path = %path.display(), count = profiles.len(), "customer profiles loaded");
        Ok(Self {
            path: path.to_owned(),
            profiles,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileLookup for FileProfiles {
    async fn customer_profile(&self, visitor_id: &str) -> Result<Option<CustomerProfile>> {
        Ok(self.profiles.get(visitor_id.trim()).cloned())
    }

    fn source(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_and_looks_up_by_id() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{
                "7": {{ "billing_phone": "+351 910 000 000", "billing_country": "PT", "order_count": 3 }},
                "8": {{}}
            }}"#
        )
        .unwrap();

        let lookup = FileProfiles::load(f.path()).unwrap();
        assert_eq!(lookup.len(), 2);

        let p = lookup.customer_profile("7").await.unwrap().unwrap();
        assert_eq!(p.billing_country.as_deref(), Some("PT"));
        assert_eq!(p.order_count, Some(3));
        assert!(p.total_spent.is_none());

        let empty = lookup.customer_profile("8").await.unwrap().unwrap();
        assert_eq!(empty, CustomerProfile::default());

        assert!(lookup.customer_profile("9").await.unwrap().is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lookup = FileProfiles::load(&dir.path().join("nope.json")).unwrap();
        assert!(lookup.is_empty());
    }

    #[test]
    fn malformed_file_is_a_commerce_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "[1, 2, 3]").unwrap();
        let err = FileProfiles::load(f.path()).unwrap_err();
        assert!(matches!(err, Error::Commerce { .. }));
    }
}
