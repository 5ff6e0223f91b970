use crate::*;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::json;

fn catalog() -> Translator {
    let t = Translator::new("de").with_fallback("en");
    t.add_catalog(
        "en",
        &json!({
            "list": { "load_more": "Load more", "end": "That's all" },
            "levels": { "warn": "Warning" },
            "filter": { "active": "Showing {level} entries ({count})" },
            "time": {
                "just_now": "just now",
                "minute_ago": "1 minute ago",
                "minutes_ago": "{count} minutes ago",
                "hours_ago": "{count} hours ago",
                "day_ago": "yesterday",
                "weeks_ago": "{count} weeks ago",
                "month_ago": "1 month ago",
                "months_ago": "{count} months ago",
                "year_ago": "1 year ago",
                "years_ago": "{count} years ago"
            },
            "retries": 3,
            "tags": ["a", "b"]
        }),
    )
    .unwrap();
    t.add_catalog_json("de", r#"{ "list": { "load_more": "Mehr laden" } }"#)
        .unwrap();
    t
}

#[test]
fn nested_catalogs_flatten_to_dotted_keys() {
    let t = catalog();
    assert_eq!(t.translate("list.load_more", &[]), "Mehr laden");
    assert_eq!(t.translate("retries", &[]), "3");
    assert!(!t.has_key("tags"));
    assert!(!t.has_key("list"));
}

#[test]
fn lookup_falls_back_to_fallback_language_then_key() {
    let t = catalog();
    assert_eq!(t.translate("list.end", &[]), "That's all");
    assert_eq!(t.translate("missing.key", &[]), "missing.key");
}

#[test]
fn params_are_substituted_and_translated_when_they_are_keys() {
    let t = catalog();
    assert_eq!(
        t.translate("filter.active", &[("level", "levels.warn"), ("count", "4")]),
        "Showing Warning entries (4)"
    );
    assert_eq!(
        t.translate("filter.active", &[("level", "plain")]),
        "Showing plain entries ({count})"
    );
}

#[test]
fn invalid_catalogs_are_rejected() {
    let t = Translator::new("en");
    assert!(matches!(
        t.add_catalog("en", &json!(["x"])),
        Err(CatalogError::NotAnObject)
    ));
    assert!(matches!(
        t.add_catalog_json("en", "{ nope"),
        Err(CatalogError::Json(_))
    ));
}

#[tokio::test]
async fn language_switch_notifies_subscribers() {
    let t = catalog();
    let mut rx = t.subscribe();
    assert_eq!(*rx.borrow(), "de");

    assert!(!t.set_language("de"));
    assert!(t.set_language("en"));
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), "en");
    assert_eq!(t.language(), "en");
    assert_eq!(t.translate("list.load_more", &[]), "Load more");
}

#[test]
fn translator_plugs_into_list_options() {
    use lazylist::Translate as _;
    let t: Arc<dyn lazylist::Translate> = Arc::new(catalog());
    assert_eq!(t.translate("list.load_more", &[]), "Mehr laden");
}

#[test]
fn time_buckets() {
    let cases = [
        (TimeDelta::seconds(-30), TimeBucket::JustNow),
        (TimeDelta::seconds(59), TimeBucket::JustNow),
        (TimeDelta::seconds(60), TimeBucket::Minutes(1)),
        (TimeDelta::minutes(59), TimeBucket::Minutes(59)),
        (TimeDelta::minutes(60), TimeBucket::Hours(1)),
        (TimeDelta::hours(23), TimeBucket::Hours(23)),
        (TimeDelta::hours(24), TimeBucket::Days(1)),
        (TimeDelta::days(6), TimeBucket::Days(6)),
        (TimeDelta::days(7), TimeBucket::Weeks(1)),
        (TimeDelta::days(27), TimeBucket::Weeks(3)),
        (TimeDelta::days(28), TimeBucket::Months(1)),
        (TimeDelta::days(65), TimeBucket::Months(2)),
        (TimeDelta::days(359), TimeBucket::Months(11)),
        (TimeDelta::days(360), TimeBucket::Years(1)),
        (TimeDelta::days(800), TimeBucket::Years(2)),
    ];
    for (elapsed, expected) in cases {
        assert_eq!(TimeBucket::from_elapsed(elapsed), expected, "{elapsed}");
    }
    assert_eq!(TimeBucket::Minutes(1).key(), "time.minute_ago");
    assert_eq!(TimeBucket::Minutes(5).key(), "time.minutes_ago");
    assert_eq!(TimeBucket::JustNow.count(), None);
    assert_eq!(TimeBucket::Years(3).count(), Some(3));
}

#[test]
fn relative_labels_go_through_the_translator() {
    let t = Arc::new(catalog());
    t.set_language("en");
    let formatter = RelativeTimeFormatter::new(t);
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();

    let at = |delta: TimeDelta| formatter.label(now - delta, now);
    assert_eq!(at(TimeDelta::seconds(10)), "just now");
    assert_eq!(at(TimeDelta::minutes(1)), "1 minute ago");
    assert_eq!(at(TimeDelta::minutes(5)), "5 minutes ago");
    assert_eq!(at(TimeDelta::hours(3)), "3 hours ago");
    assert_eq!(at(TimeDelta::days(1)), "yesterday");
    assert_eq!(at(TimeDelta::days(14)), "2 weeks ago");
    assert_eq!(at(TimeDelta::days(400)), "1 year ago");
    // No catalog entry: the raw key comes back.
    assert_eq!(at(TimeDelta::hours(1)), "time.hour_ago");
    assert_eq!(formatter.label(now + TimeDelta::hours(2), now), "just now");
}

#[test]
fn formatted_time_carries_iso_and_full_date() {
    let formatter = RelativeTimeFormatter::new(Arc::new(catalog()));
    let ts = Utc.with_ymd_and_hms(2024, 3, 10, 9, 5, 0).unwrap();
    let now = ts + TimeDelta::minutes(2);

    let formatted = formatter.format(ts, now);
    assert_eq!(formatted.iso, "2024-03-10T09:05:00.000Z");
    assert_eq!(formatted.full_date, "2024-03-10 09:05");
    assert_eq!(formatted.label, "2 minutes ago");

    let custom = formatter
        .clone()
        .with_full_date_format("%d.%m.%Y")
        .format(ts, now);
    assert_eq!(custom.full_date, "10.03.2024");
}

#[test]
fn timestamps_parse_from_rfc3339_or_millis() {
    let expected: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 3, 10, 9, 5, 0).unwrap();
    assert_eq!(parse_timestamp("2024-03-10T10:05:00+01:00"), Some(expected));
    assert_eq!(
        parse_timestamp(&expected.timestamp_millis().to_string()),
        Some(expected)
    );
    assert_eq!(parse_timestamp("yesterday"), None);
}

#[test]
fn status_messages_prefer_json_error_fields() {
    assert_eq!(
        crate::http::status_message(StatusCode::BAD_REQUEST, r#"{"message":"bad level"}"#),
        "bad level"
    );
    assert_eq!(
        crate::http::status_message(StatusCode::FORBIDDEN, r#"{"error":"no access"}"#),
        "no access"
    );
    assert_eq!(
        crate::http::status_message(StatusCode::BAD_GATEWAY, "upstream down"),
        "upstream down"
    );
    assert_eq!(
        crate::http::status_message(StatusCode::NOT_FOUND, "  "),
        "Not Found"
    );
}

#[test]
fn token_provider_ignores_blank_tokens() {
    assert_eq!(HttpFetcher::new().token(), None);
    let blank = HttpFetcher::new().with_token_provider(|| Some("  ".to_owned()));
    assert_eq!(blank.token(), None);
    let fixed = HttpFetcher::new().with_bearer("abc");
    assert_eq!(fixed.token().as_deref(), Some("abc"));
}
