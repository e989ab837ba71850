//! Per-request visitor data handed to the identity assembler.
//!
//! Nothing here is persisted: a [`VisitorContext`] is built from the
//! authentication collaborator for one render and dropped afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication state of the visitor for a single page render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VisitorContext {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedVisitor),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedVisitor {
    /// Site-side account id, also the key for the customer profile lookup.
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl VisitorContext {
    pub fn authenticated(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self::Authenticated(AuthenticatedVisitor {
            id: id.into(),
            email: email.into(),
            display_name: display_name.into(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn as_authenticated(&self) -> Option<&AuthenticatedVisitor> {
        match self {
            Self::Authenticated(v) => Some(v),
            Self::Anonymous => None,
        }
    }
}

/// E-commerce customer data used to enrich the chat contact.
///
/// Every field is optional: stores differ in what they expose, and a
/// missing field only drops that part of the contact description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default)]
    pub billing_phone: Option<String>,
    /// ISO 3166-1 alpha-2 code as stored by the shop (e.g. `"PT"`).
    #[serde(default)]
    pub billing_country: Option<String>,
    #[serde(default)]
    pub order_count: Option<u64>,
    #[serde(default)]
    pub total_spent: Option<f64>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}
