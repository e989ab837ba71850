//! Identity assembler: decides whether, and as whom, the chat SDK sees
//! the visitor.
//!
//! The SDK treats a present `identifier_hash` as proof that the server
//! vouched for the identifier, so an identity is only produced for an
//! authenticated visitor *and* a configured shared secret.  Everyone else
//! chats anonymously.

use cw_domain::settings::WidgetSettings;
use cw_domain::trace::TraceEvent;
use cw_domain::visitor::{CustomerProfile, VisitorContext};
use serde::Serialize;

use crate::profile::{self, DateStyle};
use crate::signing;

/// Signed visitor identity, computed fresh for every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorIdentity {
    /// Identifier passed as the first `setUser` argument (the email).
    pub identifier: String,
    pub email: String,
    pub name: String,
    pub identifier_hash: String,
    pub phone_number: String,
    pub description: String,
    pub customer_id: String,
    pub country: String,
}

/// Second argument of `$chatwoot.setUser(identifier, attributes)`.
#[derive(Debug, Serialize)]
pub struct SetUserAttributes<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub identifier_hash: &'a str,
    pub avatar_url: &'a str,
    pub phone_number: &'a str,
    pub description: &'a str,
    pub custom_attributes: CustomAttributes<'a>,
}

#[derive(Debug, Serialize)]
pub struct CustomAttributes<'a> {
    pub customer_id: &'a str,
    pub country: &'a str,
}

impl VisitorIdentity {
    pub fn set_user_attributes(&self) -> SetUserAttributes<'_> {
        SetUserAttributes {
            email: &self.email,
            name: &self.name,
            identifier_hash: &self.identifier_hash,
            avatar_url: "",
            phone_number: &self.phone_number,
            description: &self.description,
            custom_attributes: CustomAttributes {
                customer_id: &self.customer_id,
                country: &self.country,
            },
        }
    }
}

/// Builds [`VisitorIdentity`] values from a settings snapshot.
#[derive(Debug, Clone, Copy)]
pub struct IdentityAssembler<'a> {
    settings: &'a WidgetSettings,
    dates: &'a DateStyle,
}

impl<'a> IdentityAssembler<'a> {
    pub fn new(settings: &'a WidgetSettings, dates: &'a DateStyle) -> Self {
        Self { settings, dates }
    }

    /// Whether [`assemble`](Self::assemble) could produce an identity for
    /// this visitor.  Lets callers skip the profile lookup otherwise.
    pub fn wants_identity(&self, visitor: &VisitorContext) -> bool {
        self.settings.is_configured()
            && self.settings.has_identity_secret()
            && visitor
                .as_authenticated()
                .is_some_and(|v| !v.email.trim().is_empty())
    }

    /// Sign and enrich the visitor.  `None` means anonymous mode.
    ///
    /// A missing profile never blocks assembly; it only leaves phone,
    /// country and description empty.
    pub fn assemble(
        &self,
        visitor: &VisitorContext,
        customer: Option<&CustomerProfile>,
    ) -> Option<VisitorIdentity> {
        if !self.wants_identity(visitor) {
            if visitor.is_authenticated() && !self.settings.has_identity_secret() {
                tracing::debug!("no HMAC secret configured, widget stays anonymous");
            }
            return None;
        }
        let visitor = visitor.as_authenticated()?;
        let email = visitor.email.trim();
        let identifier_hash = signing::identifier_hash(&self.settings.hmac_token, email)?;
        let enrichment = profile::enrich(customer, self.dates);

        TraceEvent::IdentityAssembled {
            visitor_id: visitor.id.clone(),
            has_phone: !enrichment.phone_number.is_empty(),
            has_country: !enrichment.country.is_empty(),
        }
        .emit();

        Some(VisitorIdentity {
            identifier: email.to_owned(),
            email: email.to_owned(),
            name: visitor.display_name.clone(),
            identifier_hash,
            phone_number: enrichment.phone_number,
            description: enrichment.description,
            customer_id: visitor.id.clone(),
            country: enrichment.country,
        })
    }
}
