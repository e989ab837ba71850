//! Customer profile enrichment for the chat contact.
//!
//! Best effort: every field may be missing and a missing field only drops
//! its part of the description, it never blocks identity assembly.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cw_domain::visitor::CustomerProfile;

use crate::countries;

/// How account-creation dates are shown (site date format and time zone).
#[derive(Debug, Clone)]
pub struct DateStyle {
    /// strftime pattern.
    pub format: String,
    pub timezone: Tz,
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            format: "%B %-d, %Y".into(),
            timezone: Tz::UTC,
        }
    }
}

impl DateStyle {
    /// Build from the site config values.  An unknown zone falls back to UTC
    /// (config validation reports it separately).
    pub fn new(format: &str, timezone: &str) -> Self {
        let timezone = match timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(timezone, "unknown site time zone, showing dates in UTC");
                Tz::UTC
            }
        };
        Self {
            format: format.to_owned(),
            timezone,
        }
    }

    /// Format `at` in the site zone.  A malformed pattern degrades to ISO
    /// dates instead of failing the render.
    pub fn format(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.timezone);
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.format)).is_err() {
            tracing::debug!(format = %self.format, "invalid date format, using ISO date");
            return local.format("%Y-%m-%d").to_string();
        }
        out
    }
}

/// Contact attributes derived from a [`CustomerProfile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEnrichment {
    pub phone_number: String,
    /// Display name of the billing country (raw code when unmapped).
    pub country: String,
    pub description: String,
}

impl ProfileEnrichment {
    pub fn is_empty(&self) -> bool {
        self.phone_number.is_empty() && self.country.is_empty() && self.description.is_empty()
    }
}

/// Derive contact attributes from an optional profile.
pub fn enrich(profile: Option<&CustomerProfile>, dates: &DateStyle) -> ProfileEnrichment {
    let Some(profile) = profile else {
        return ProfileEnrichment::default();
    };

    let phone_number = non_blank(profile.billing_phone.as_deref()).unwrap_or_default();
    let country = non_blank(profile.billing_country.as_deref())
        .map(|code| countries::country_name(&code))
        .unwrap_or_default();

    let mut parts = Vec::with_capacity(4);
    if let Some(created) = profile.date_created {
        parts.push(format!("Customer since: {}", dates.format(created)));
    }
    if let Some(orders) = profile.order_count {
        parts.push(format!("Orders: {orders}"));
    }
    if let Some(spent) = profile.total_spent {
        parts.push(format!("Total spent: {}", format_spend(spent)));
    }
    if !country.is_empty() {
        parts.push(format!("Country: {country}"));
    }

    ProfileEnrichment {
        phone_number,
        country,
        description: parts.join(" | "),
    }
}

/// Lifetime spend with exactly two decimals.
pub fn format_spend(amount: f64) -> String {
    if amount.is_finite() {
        format!("{amount:.2}")
    } else {
        "0.00".into()
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn full_profile() -> CustomerProfile {
        CustomerProfile {
            billing_phone: Some("+244 923 000 000".into()),
            billing_country: Some("AO".into()),
            order_count: Some(3),
            total_spent: Some(149.5),
            date_created: Some(Utc.with_ymd_and_hms(2023, 2, 7, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn full_profile_builds_complete_description() {
        let e = enrich(Some(&full_profile()), &DateStyle::default());
        assert_eq!(e.phone_number, "+244 923 000 000");
        assert_eq!(e.country, "Angola");
        assert_eq!(
            e.description,
            "Customer since: February 7, 2023 | Orders: 3 | Total spent: 149.50 | Country: Angola"
        );
    }

    #[test]
    fn missing_fields_are_omitted() {
        let p = CustomerProfile {
            order_count: Some(0),
            ..Default::default()
        };
        let e = enrich(Some(&p), &DateStyle::default());
        assert_eq!(e.description, "Orders: 0");
        assert!(e.phone_number.is_empty());
        assert!(e.country.is_empty());
    }

    #[test]
    fn absent_profile_is_empty() {
        let e = enrich(None, &DateStyle::default());
        assert!(e.is_empty());
    }

    #[test]
    fn unmapped_country_keeps_code() {
        let p = CustomerProfile {
            billing_country: Some("XK".into()),
            ..Default::default()
        };
        let e = enrich(Some(&p), &DateStyle::default());
        assert_eq!(e.country, "XK");
        assert_eq!(e.description, "Country: XK");
    }

    #[test]
    fn dates_use_site_zone_and_format() {
        let style = DateStyle::new("%d/%m/%Y", "Asia/Tokyo");
        let late_utc = Utc.with_ymd_and_hms(2024, 1, 31, 20, 0, 0).unwrap();
        assert_eq!(style.format(late_utc), "01/02/2024");
    }

    #[test]
    fn unknown_zone_falls_back_to_utc() {
        let style = DateStyle::new("%Y-%m-%d %H", "Mars/Olympus_Mons");
        assert_eq!(style.timezone, Tz::UTC);
        let at = Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap();
        assert_eq!(style.format(at), "2024-01-31 23");
    }

    #[test]
    fn malformed_pattern_falls_back_to_iso() {
        let style = DateStyle::new("%Q", "UTC");
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(style.format(at), "2024-03-09");
    }

    #[test]
    fn spend_has_two_decimals() {
        assert_eq!(format_spend(10.0), "10.00");
        assert_eq!(format_spend(12.3456), "12.35");
        assert_eq!(format_spend(f64::NAN), "0.00");
    }
}
