//! End-to-end render behavior across identity, reset and snippet modules.
//!
//! Each test drives `render_page` the way a web backend would: a settings
//! snapshot, the visitor, an optional profile and the request's cookies.

use chrono::{TimeZone, Utc};
use cw_domain::settings::WidgetSettings;
use cw_domain::visitor::{CustomerProfile, VisitorContext};
use cw_widget::reset::{CookieScope, MARKER_COOKIE};
use cw_widget::signing::{identifier_hash, verify_identifier_hash};
use cw_widget::{render_page, render_page_with, DateStyle, IdentityAssembler, ResetCoordinator};

fn configured() -> WidgetSettings {
    WidgetSettings {
        base_url: "https://app.chatwoot.com".into(),
        widget_token: "tok".into(),
        hmac_token: "s3cret".into(),
        ..Default::default()
    }
}

fn ana() -> VisitorContext {
    VisitorContext::authenticated("7", "a@example.com", "Ana")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Configuration gate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn missing_base_url_or_token_renders_nothing() {
    let dates = DateStyle::default();
    for settings in [
        WidgetSettings {
            base_url: String::new(),
            ..configured()
        },
        WidgetSettings {
            widget_token: "   ".into(),
            ..configured()
        },
    ] {
        let page = render_page(
            &settings,
            &ana(),
            None,
            &dates,
            Some("chatwoot_reset_needed=1"),
        );
        assert!(page.footer.is_none());
        assert!(page.head.is_none(), "no reset script when unconfigured");
        assert!(page.set_cookie.is_none());
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Signing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn digest_is_deterministic_and_input_sensitive() {
    let a = identifier_hash("s3cret", "a@example.com").unwrap();
    assert_eq!(a, identifier_hash("s3cret", "a@example.com").unwrap());
    assert_eq!(
        a,
        "34d9be66017eae9ac9b5f7adbb23a4db414c50921b831e74f6bb1bcfb93890cf"
    );
    assert_ne!(a, identifier_hash("s3cret", "b@example.com").unwrap());
    assert_ne!(a, identifier_hash("other", "a@example.com").unwrap());
    assert!(verify_identifier_hash("s3cret", "a@example.com", &a.to_uppercase()));
}

#[test]
fn rendered_footer_carries_the_digest() {
    let page = render_page(&configured(), &ana(), None, &DateStyle::default(), None);
    let footer = page.footer.unwrap();
    assert!(footer.contains(
        "\"identifier_hash\":\"34d9be66017eae9ac9b5f7adbb23a4db414c50921b831e74f6bb1bcfb93890cf\""
    ));
}

#[test]
fn empty_secret_renders_anonymous_widget() {
    let settings = WidgetSettings {
        hmac_token: String::new(),
        ..configured()
    };
    let page = render_page(&settings, &ana(), None, &DateStyle::default(), None);
    let footer = page.footer.unwrap();
    assert!(footer.contains("chatwootSDK.run"));
    assert!(!footer.contains("setUser("));
    assert!(!footer.contains("identifier_hash"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reset lifecycle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn sign_out_then_two_renders_resets_once() {
    let settings = configured();
    let dates = DateStyle::default();
    let coordinator = ResetCoordinator::new(CookieScope {
        path: "/".into(),
        domain: Some("shop.example.com".into()),
        secure: true,
    });

    let set_cookie = coordinator.on_sign_out(&settings).unwrap();
    assert!(set_cookie.starts_with(&format!("{MARKER_COOKIE}=1;")));

    // Browser echoes the marker back on the next request.
    let jar = "theme=dark; chatwoot_reset_needed=1";
    let next = render_page_with(&coordinator, &settings, &VisitorContext::Anonymous, None, &dates, Some(jar));
    let head = next.head.unwrap();
    assert_eq!(head.matches("window.$chatwoot.reset();").count(), 1);
    let clear = next.set_cookie.unwrap();
    assert!(clear.contains("Max-Age=0"));
    assert!(clear.contains("Domain=shop.example.com"));

    // Cleared cookie is no longer sent.
    let after = render_page_with(&coordinator, &settings, &VisitorContext::Anonymous, None, &dates, Some("theme=dark"));
    assert!(after.head.is_none());
    assert!(after.set_cookie.is_none());
    assert!(after.footer.is_some());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Profile enrichment
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn unavailable_profile_still_identifies() {
    let settings = configured();
    let dates = DateStyle::default();
    let id = IdentityAssembler::new(&settings, &dates)
        .assemble(&ana(), None)
        .unwrap();
    assert_eq!(id.identifier, "a@example.com");
    assert_eq!(id.identifier_hash.len(), 64);
    assert!(id.phone_number.is_empty());
    assert!(id.description.is_empty());
    assert!(id.country.is_empty());
}

#[test]
fn full_profile_builds_description() {
    let settings = configured();
    let dates = DateStyle::default();
    let profile = CustomerProfile {
        billing_phone: Some("+1 555 0100".into()),
        billing_country: Some("US".into()),
        order_count: Some(4),
        total_spent: Some(99.9),
        date_created: Utc.with_ymd_and_hms(2021, 11, 30, 9, 0, 0).single(),
    };
    let page = render_page(&settings, &ana(), Some(&profile), &dates, None);
    let footer = page.footer.unwrap();
    assert!(footer.contains(
        "\"description\":\"Customer since: November 30, 2021 | Orders: 4 | Total spent: 99.90 | Country: United States (US)\""
    ));
    assert!(footer.contains("\"phone_number\":\"+1 555 0100\""));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Injection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn hostile_values_cannot_close_the_script() {
    let settings = WidgetSettings {
        widget_token: "tok\"</script><script>alert(1)</script>".into(),
        locale: "en'</script>".into(),
        ..configured()
    };
    let visitor = VisitorContext::authenticated(
        "7\"; alert(1); //",
        "a@example.com",
        "Ana \"</script><img src=x onerror=alert(1)>",
    );
    let baseline = render_page(&configured(), &ana(), None, &DateStyle::default(), None)
        .footer
        .unwrap();
    let footer = render_page(&settings, &visitor, None, &DateStyle::default(), None)
        .footer
        .unwrap();

    // Only the renderer's own script elements close.
    assert_eq!(
        footer.matches("</script>").count(),
        baseline.matches("</script>").count()
    );
    assert!(!footer.contains("<img"));
    assert!(footer.contains("Ana \\\"\\u003c/script\\u003e"));
    assert!(footer.contains("\"customer_id\":\"7\\\"; alert(1); //\""));
}
