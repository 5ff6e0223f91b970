// Example: translated relative-time labels, switching language at runtime.
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use lazylist_adapter::{RelativeTimeFormatter, Translator};
use serde_json::json;

fn main() -> Result<(), lazylist_adapter::CatalogError> {
    let translator = Arc::new(Translator::new("de").with_fallback("en"));
    translator.add_catalog(
        "en",
        &json!({ "time": {
            "just_now": "just now",
            "minutes_ago": "{count} minutes ago",
            "hours_ago": "{count} hours ago",
            "days_ago": "{count} days ago"
        }}),
    )?;
    translator.add_catalog_json(
        "de",
        r#"{ "time": { "minutes_ago": "vor {count} Minuten", "hours_ago": "vor {count} Stunden" } }"#,
    )?;

    let formatter = RelativeTimeFormatter::new(translator.clone());
    let now = Utc::now();
    let stamps = [
        TimeDelta::seconds(20),
        TimeDelta::minutes(12),
        TimeDelta::hours(5),
        TimeDelta::days(3),
    ];

    for language in ["de", "en"] {
        translator.set_language(language);
        for elapsed in stamps {
            let formatted = formatter.format(now - elapsed, now);
            println!("{language}: {:<20} {}", formatted.label, formatted.full_date);
        }
    }
    Ok(())
}
