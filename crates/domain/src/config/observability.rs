use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Logging and OpenTelemetry configuration for `serve`.
///
/// `RUST_LOG` still wins over `log_filter` when set.  Setting
/// `otlp_endpoint` adds an OTLP/gRPC exporter so every `tracing` span
/// (including the per-request `TraceLayer` spans) reaches a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "d_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines (`true`) or the compact human format.
    #[serde(default = "d_true")]
    pub json_logs: bool,

    /// OTLP gRPC endpoint (e.g. `http://localhost:4317`).
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// The `service.name` resource attribute reported to the collector.
    #[serde(default = "d_service_name")]
    pub service_name: String,

    /// Trace sampling rate (`0.0` = never, `1.0` = always).
    #[serde(default = "d_sample_rate")]
    pub sample_rate: f64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: d_log_filter(),
            json_logs: true,
            otlp_endpoint: None,
            service_name: d_service_name(),
            sample_rate: d_sample_rate(),
        }
    }
}

fn d_log_filter() -> String {
    "info,cw_gateway=debug".into()
}

fn d_true() -> bool {
    true
}

fn d_service_name() -> String {
    "chatwoot-gate".into()
}

fn d_sample_rate() -> f64 {
    1.0
}
