//! `cw-widget`: server-side rendering of the Chatwoot chat widget.
//!
//! Two components run on every page render:
//!
//! - the **identity assembler** ([`IdentityAssembler`]) signs the visitor's
//!   email with the shared HMAC secret, enriches it with customer data and
//!   renders the footer script that loads the SDK and identifies the visitor;
//! - the **reset coordinator** ([`ResetCoordinator`]) turns a sign-out into a
//!   one-shot `$chatwoot.reset()` on the visitor's next page.
//!
//! Nothing here touches the network or a web framework: callers pass a
//! settings snapshot, the visitor context and an optional customer profile,
//! and get back strings to splice into the page.
//!
//! ```rust
//! use cw_domain::settings::WidgetSettings;
//! use cw_domain::visitor::VisitorContext;
//! use cw_widget::{render_page, DateStyle};
//!
//! let mut settings = WidgetSettings::default();
//! settings.base_url = "https://app.chatwoot.com".into();
//! settings.widget_token = "tok".into();
//! settings.hmac_token = "s3cret".into();
//!
//! let visitor = VisitorContext::authenticated("7", "a@example.com", "Ana");
//! let page = render_page(&settings, &visitor, None, &DateStyle::default(), None);
//! assert!(page.footer.unwrap().contains("setUser"));
//! ```

pub mod console;
pub mod countries;
pub mod escape;
pub mod identity;
pub mod profile;
pub mod readiness;
pub mod reset;
pub mod signing;
pub mod snippet;

pub use identity::{IdentityAssembler, VisitorIdentity};
pub use profile::{DateStyle, ProfileEnrichment};
pub use readiness::{ReadinessWait, WaitState};
pub use reset::{ResetCoordinator, ResetOutcome, ResetPhase};
pub use snippet::{render_page, render_page_with, render_widget, PageFragments};
