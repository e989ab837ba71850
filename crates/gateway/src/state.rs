use std::sync::Arc;

use cw_commerce::ProfileLookup;
use cw_domain::config::Config;
use cw_widget::{DateStyle, ResetCoordinator};

use crate::settings_store::SettingsStore;

/// Shared application state passed to all handlers and the page middleware.
///
/// Fields are grouped by concern:
/// - **Core**: config, the widget settings store
/// - **Rendering**: profile lookup, reset coordinator, date style
/// - **Security**: admin token digest
#[derive(Clone)]
pub struct AppState {
    // ── Core ──────────────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub settings: Arc<SettingsStore>,

    // ── Rendering ─────────────────────────────────────────────────────
    pub profiles: Arc<dyn ProfileLookup>,
    pub reset: Arc<ResetCoordinator>,
    /// Site date format and time zone, parsed once at startup.
    pub dates: Arc<DateStyle>,

    // ── Security (startup-computed) ───────────────────────────────────
    /// SHA-256 hash of the admin token (read once at startup).
    /// `None` = dev mode (admin form accessible without auth).
    pub admin_token_hash: Option<Vec<u8>>,
}
