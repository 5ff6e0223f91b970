use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use lazylist::Translate;

/// How long ago something happened, bucketed for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeBucket {
    /// Less than a minute ago, or in the future.
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
    /// 30-day months.
    Months(i64),
    /// 365-day years.
    Years(i64),
}

impl TimeBucket {
    pub fn from_elapsed(elapsed: TimeDelta) -> Self {
        let seconds = elapsed.num_seconds();
        if seconds < 60 {
            return Self::JustNow;
        }
        let minutes = seconds / 60;
        if minutes < 60 {
            return Self::Minutes(minutes);
        }
        let hours = minutes / 60;
        if hours < 24 {
            return Self::Hours(hours);
        }
        let days = hours / 24;
        if days < 7 {
            return Self::Days(days);
        }
        let weeks = days / 7;
        if weeks < 4 {
            return Self::Weeks(weeks);
        }
        let months = (days / 30).max(1);
        if months < 12 {
            return Self::Months(months);
        }
        Self::Years((days / 365).max(1))
    }

    /// The translation key for this bucket; singular and plural counts use distinct keys.
    pub fn key(&self) -> &'static str {
        match *self {
            Self::JustNow => "time.just_now",
            Self::Minutes(1) => "time.minute_ago",
            Self::Minutes(_) => "time.minutes_ago",
            Self::Hours(1) => "time.hour_ago",
            Self::Hours(_) => "time.hours_ago",
            Self::Days(1) => "time.day_ago",
            Self::Days(_) => "time.days_ago",
            Self::Weeks(1) => "time.week_ago",
            Self::Weeks(_) => "time.weeks_ago",
            Self::Months(1) => "time.month_ago",
            Self::Months(_) => "time.months_ago",
            Self::Years(1) => "time.year_ago",
            Self::Years(_) => "time.years_ago",
        }
    }

    pub fn count(&self) -> Option<i64> {
        match *self {
            Self::JustNow => None,
            Self::Minutes(n)
            | Self::Hours(n)
            | Self::Days(n)
            | Self::Weeks(n)
            | Self::Months(n)
            | Self::Years(n) => Some(n),
        }
    }
}

/// A formatted timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelativeTime {
    /// Localized relative label ("5 minutes ago").
    pub label: String,
    /// RFC 3339 in UTC with millisecond precision.
    pub iso: String,
    /// Absolute date, formatted with the formatter's pattern.
    pub full_date: String,
}

/// Turns timestamps into relative-time labels through a translator.
#[derive(Clone)]
pub struct RelativeTimeFormatter {
    translator: Arc<dyn Translate>,
    full_date_format: String,
}

impl RelativeTimeFormatter {
    pub const DEFAULT_FULL_DATE_FORMAT: &'static str = "%Y-%m-%d %H:%M";

    pub fn new(translator: Arc<dyn Translate>) -> Self {
        Self {
            translator,
            full_date_format: Self::DEFAULT_FULL_DATE_FORMAT.to_owned(),
        }
    }

    /// A `chrono` strftime pattern for [`RelativeTime::full_date`].
    pub fn with_full_date_format(mut self, format: impl Into<String>) -> Self {
        self.full_date_format = format.into();
        self
    }

    pub fn format(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> RelativeTime {
        RelativeTime {
            label: self.label(timestamp, now),
            iso: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            full_date: self.full_date(timestamp),
        }
    }

    pub fn format_now(&self, timestamp: DateTime<Utc>) -> RelativeTime {
        self.format(timestamp, Utc::now())
    }

    pub fn label(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let bucket = TimeBucket::from_elapsed(now.signed_duration_since(timestamp));
        match bucket.count() {
            Some(count) => {
                let count = count.to_string();
                self.translator.translate(bucket.key(), &[("count", count.as_str())])
            }
            None => self.translator.translate(bucket.key(), &[]),
        }
    }

    /// Falls back to the RFC 3339 form when the pattern cannot be rendered.
    fn full_date(&self, timestamp: DateTime<Utc>) -> String {
        let mut out = String::new();
        match write!(out, "{}", timestamp.format(&self.full_date_format)) {
            Ok(()) => out,
            Err(_) => timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

impl core::fmt::Debug for RelativeTimeFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RelativeTimeFormatter")
            .field("full_date_format", &self.full_date_format)
            .finish_non_exhaustive()
    }
}

/// Parses an RFC 3339 string or a Unix timestamp in milliseconds.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(millis) = input.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
