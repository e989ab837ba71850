//! WooCommerce REST implementation of [`ProfileLookup`].
//!
//! `WooCommerceClient` wraps a `reqwest::Client` and reads one customer
//! record per lookup from `GET {base}/wp-json/wc/v3/customers/{id}`, with
//! retry + exponential back-off on transient (5xx / timeout) failures.
//! Authentication is the REST API consumer key pair over HTTP basic auth.
//!
//! The v3 customer schema carries no order statistics, so the order count
//! and lifetime spend come from the customer's order list
//! (`GET /wc/v3/orders?customer={id}`): the count from `X-WP-Total`, the
//! spend from summing `total` over paid orders.  Order statistics are best
//! effort; when they cannot be read the profile is returned without them.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use cw_domain::config::WooCommerceConfig;
use cw_domain::error::{Error, Result};
use cw_domain::trace::TraceEvent;
use cw_domain::visitor::CustomerProfile;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::provider::ProfileLookup;

const SOURCE: &str = "woocommerce";

/// Order statuses WooCommerce counts towards a customer's total spent.
const PAID_STATUSES: &[&str] = &["processing", "completed"];
/// Orders fetched per page when summing spend (the REST API maximum).
const ORDERS_PER_PAGE: u32 = 100;
/// Spend is only reported when the whole order history fits in this many
/// pages.
pub const MAX_ORDER_PAGES: u32 = 5;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST client for one WooCommerce shop.
///
/// Created once at startup and shared by every render.  The underlying
/// `reqwest::Client` maintains a connection pool.
#[derive(Clone)]
pub struct WooCommerceClient {
    http: Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
    timeout: Duration,
    max_retries: u32,
}

impl std::fmt::Debug for WooCommerceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl WooCommerceClient {
    /// Build a client, reading the consumer key pair from the environment
    /// variables named in the config.
    pub fn new(cfg: &WooCommerceConfig) -> Result<Self> {
        let key = std::env::var(&cfg.consumer_key_env).map_err(|_| {
            Error::Config(format!("{} is not set", cfg.consumer_key_env))
        })?;
        let secret = std::env::var(&cfg.consumer_secret_env).map_err(|_| {
            Error::Config(format!("{} is not set", cfg.consumer_secret_env))
        })?;
        Self::with_credentials(cfg, key, secret)
    }

    pub fn with_credentials(
        cfg: &WooCommerceConfig,
        consumer_key: String,
        consumer_secret: String,
    ) -> Result<Self> {
        if cfg.base_url.trim().is_empty() {
            return Err(Error::Config("commerce.woocommerce.base_url is empty".into()));
        }
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim().trim_end_matches('/').to_owned(),
            consumer_key,
            consumer_secret,
            timeout,
            max_retries: cfg.max_retries,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL for a customer record.
    pub fn customer_url(&self, customer_id: &str) -> String {
        format!("{}/wp-json/wc/v3/customers/{}", self.base_url, customer_id)
    }

    /// Order list URL; filters go in the query string.
    pub fn orders_url(&self) -> String {
        format!("{}/wp-json/wc/v3/orders", self.base_url)
    }

    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .header("Accept", "application/json")
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient errors.
    ///
    /// * Retries on 5xx status codes and on timeouts.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * 404 resolves to `Ok(None)`.
    /// * Emits a `TraceEvent::CommerceCall` after every attempt.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Option<Response>> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let result = self.decorate(build_request()).send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    TraceEvent::CommerceCall {
                        endpoint: endpoint.to_owned(),
                        status: status.as_u16(),
                        duration_ms,
                    }
                    .emit();

                    if status.is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(commerce_err(format!("{endpoint} returned {status}: {body}")));
                        continue;
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }

                    if status.is_client_error() {
                        let body = resp.text().await.unwrap_or_default();
                        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                            return Err(Error::Auth(format!(
                                "{endpoint} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(commerce_err(format!("{endpoint} returned {status}: {body}")));
                    }

                    return Ok(Some(resp));
                }
                Err(e) => {
                    TraceEvent::CommerceCall {
                        endpoint: endpoint.to_owned(),
                        status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                        duration_ms,
                    }
                    .emit();
                    last_err = Some(from_reqwest(e));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| commerce_err(format!("{endpoint}: all retries exhausted"))))
    }
}

/// Order statistics for one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderStats {
    /// Orders in any status (`X-WP-Total`).
    pub count: u64,
    /// Sum of paid order totals; `None` when the history was too long to
    /// read in full.
    pub total_spent: Option<f64>,
}

impl WooCommerceClient {
    /// Count the customer's orders and sum what they have paid.
    pub async fn order_stats(&self, customer_id: &str) -> Result<OrderStats> {
        let url = self.orders_url();
        let mut count = 0u64;
        let mut spent = 0.0f64;
        let mut page = 1u32;

        loop {
            let query = [
                ("customer", customer_id.to_owned()),
                ("status", "any".to_owned()),
                ("per_page", ORDERS_PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("_fields", "status,total".to_owned()),
            ];
            let Some(resp) = self
                .execute_with_retry("GET /wc/v3/orders", || self.http.get(&url).query(&query))
                .await?
            else {
                return Err(commerce_err("order list endpoint not found".into()));
            };

            let total_pages = header_u64(&resp, "x-wp-totalpages").unwrap_or(1);
            let (wp_total, orders) = read_orders(resp).await?;
            if page == 1 {
                count = wp_total.unwrap_or(orders.len() as u64);
            }
            spent += paid_total(&orders);

            if u64::from(page) >= total_pages {
                return Ok(OrderStats {
                    count,
                    total_spent: Some(spent),
                });
            }
            if page >= MAX_ORDER_PAGES {
                tracing::debug!(
                    customer_id,
                    total_pages,
                    "order history too long, total spent omitted"
                );
                return Ok(OrderStats {
                    count,
                    total_spent: None,
                });
            }
            page += 1;
        }
    }
}

/// `X-WP-Total` and the decoded page.
async fn read_orders(resp: Response) -> Result<(Option<u64>, Vec<WooOrder>)> {
    let total = header_u64(&resp, "x-wp-total");
    let body = resp.text().await.map_err(from_reqwest)?;
    let orders: Vec<WooOrder> = serde_json::from_str(&body)
        .map_err(|e| commerce_err(format!("failed to parse orders: {e}")))?;
    Ok((total, orders))
}

fn header_u64(resp: &Response, name: &str) -> Option<u64> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[async_trait]
impl ProfileLookup for WooCommerceClient {
    async fn customer_profile(&self, visitor_id: &str) -> Result<Option<CustomerProfile>> {
        let id = visitor_id.trim();
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            // WooCommerce customer ids are numeric user ids.
            return Ok(None);
        }
        let url = self.customer_url(id);
        let Some(resp) = self
            .execute_with_retry("GET /wc/v3/customers/{id}", || self.http.get(&url))
            .await?
        else {
            return Ok(None);
        };

        let body = resp.text().await.map_err(from_reqwest)?;
        let mut profile = parse_customer(&body)?;

        if profile.order_count.is_none() || profile.total_spent.is_none() {
            match self.order_stats(id).await {
                Ok(stats) => {
                    profile.order_count = profile.order_count.or(Some(stats.count));
                    profile.total_spent = profile.total_spent.or(stats.total_spent);
                }
                Err(e) => {
                    tracing::warn!(customer_id = id, error = %e, "order statistics unavailable");
                }
            }
        }
        Ok(Some(profile))
    }

    fn source(&self) -> &'static str {
        SOURCE
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Deserialize)]
struct WooCustomer {
    #[serde(default)]
    date_created_gmt: Option<String>,
    #[serde(default)]
    billing: WooBilling,
    /// Only the legacy `wc/v1` schema includes these; values may be numbers
    /// or numeric strings.  With v3 they come from the order list.
    #[serde(default)]
    orders_count: Option<serde_json::Value>,
    #[serde(default)]
    total_spent: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct WooOrder {
    #[serde(default)]
    status: String,
    /// Decimal string in the store currency.
    #[serde(default)]
    total: Option<serde_json::Value>,
}

/// Sum of `total` over orders in a paid status.
fn paid_total(orders: &[WooOrder]) -> f64 {
    orders
        .iter()
        .filter(|o| PAID_STATUSES.contains(&o.status.as_str()))
        .filter_map(|o| o.total.as_ref().and_then(as_f64))
        .sum()
}

#[derive(Debug, Default, Deserialize)]
struct WooBilling {
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Map a WooCommerce customer document onto [`CustomerProfile`].
pub fn parse_customer(body: &str) -> Result<CustomerProfile> {
    let c: WooCustomer = serde_json::from_str(body)
        .map_err(|e| commerce_err(format!("failed to parse customer: {e}")))?;

    Ok(CustomerProfile {
        billing_phone: c.billing.phone.filter(|s| !s.trim().is_empty()),
        billing_country: c.billing.country.filter(|s| !s.trim().is_empty()),
        order_count: c.orders_count.as_ref().and_then(as_f64).map(|n| n as u64),
        total_spent: c.total_spent.as_ref().and_then(as_f64),
        date_created: c.date_created_gmt.as_deref().and_then(parse_gmt),
    })
}

fn as_f64(v: &serde_json::Value) -> Option<f64> {
    let n: f64 = match v {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

/// WooCommerce emits `date_created_gmt` without an offset.
fn parse_gmt(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|n| n.and_utc())
}

fn commerce_err(message: String) -> Error {
    Error::Commerce {
        source_name: SOURCE.into(),
        message,
    }
}

/// Convert a `reqwest::Error` into our domain `Error`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
