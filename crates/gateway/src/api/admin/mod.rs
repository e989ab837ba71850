//! Admin endpoints: settings form and system info.
//!
//! All admin-guarded endpoints use the `AdminGuard` extractor (see `guard.rs`),
//! which enforces the admin token from `CW_ADMIN_TOKEN`.  If the env var is
//! unset, endpoints are accessible without auth (dev mode).

mod guard;
mod health;
mod settings_page;

pub use guard::{presented_token, AdminGuard};
pub use health::{health, system_info};
pub use settings_page::{save as save_settings, show as show_settings};
