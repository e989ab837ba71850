use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    /// Upper bound on in-flight requests (tower `ConcurrencyLimitLayer`).
    #[serde(default = "d_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// HTML responses larger than this are passed through without the
    /// widget being injected.
    #[serde(default = "d_max_html_bytes")]
    pub max_html_bytes: usize,
    /// Per-IP token-bucket rate limiting.  `None` disables it.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_port(),
            host: d_host(),
            max_concurrent_requests: d_max_concurrent(),
            max_html_bytes: d_max_html_bytes(),
            rate_limit: None,
        }
    }
}

/// Per-IP token-bucket rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// One token is added every `1 / requests_per_second` seconds.
    pub requests_per_second: u64,
    /// Maximum tokens in the bucket.
    pub burst_size: u32,
}

fn d_port() -> u16 {
    8088
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_max_concurrent() -> usize {
    256
}
fn d_max_html_bytes() -> usize {
    4 * 1024 * 1024
}
