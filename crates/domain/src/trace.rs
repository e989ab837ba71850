use serde::Serialize;

/// Structured trace events emitted across all Chatwoot gateway crates.
///
/// Events never carry the HMAC secret or the identifier digest.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    WidgetRendered {
        identified: bool,
        enriched: bool,
        debug: bool,
    },
    WidgetSkipped {
        reason: String,
    },
    IdentityAssembled {
        visitor_id: String,
        has_phone: bool,
        has_country: bool,
    },
    ProfileLookup {
        source: String,
        visitor_id: String,
        found: bool,
        duration_ms: u64,
    },
    CommerceCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    ResetMarked {
        max_age_secs: u64,
    },
    ResetDelivered {
        path: String,
    },
    SettingsSaved {
        changed: Vec<String>,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cw_event");
    }
}
