//! Normalizes the heterogeneous date values found in post front-matter into a
//! single timezone-aware instant. Every value without an explicit offset is
//! read as wall time in Korea Standard Time (UTC+9), which is also the zone
//! used for "today" and for the relative labels shown next to posts.

use std::sync::LazyLock;

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone, Timelike, Utc,
};
use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Offset of the site's timezone from UTC, in seconds.
pub const OFFSET_SECONDS: i32 = 9 * 60 * 60;

/// Returns the site's fixed timezone (UTC+9).
pub fn offset() -> FixedOffset {
    FixedOffset::east_opt(OFFSET_SECONDS).expect("UTC+9 is a valid offset")
}

/// A date value as it arrives from front-matter or from a caller that has
/// already resolved it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateInput {
    /// An instant that was already normalized. Returned unchanged.
    Instant(DateTime<FixedOffset>),

    /// Any scalar text taken from front-matter.
    Text(String),
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(instant: DateTime<FixedOffset>) -> DateInput {
        DateInput::Instant(instant)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> DateInput {
        DateInput::Text(text.to_owned())
    }
}

impl<'de> Deserialize<'de> for DateInput {
    /// Accepts any YAML scalar. Numbers and booleans are kept as their
    /// textual form so that they surface as an unrecognized date rather than
    /// as a front-matter parse failure.
    fn deserialize<D>(deserializer: D) -> Result<DateInput, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        use serde_yaml::Value;
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(DateInput::Text(s)),
            Value::Number(n) => Ok(DateInput::Text(n.to_string())),
            Value::Bool(b) => Ok(DateInput::Text(b.to_string())),
            other => Err(D::Error::custom(format!(
                "expected a date scalar, found {:?}",
                other
            ))),
        }
    }
}

/// Returned when a date value matches none of the supported forms.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateError {
    /// The text is not a date in any supported form.
    #[error("unrecognized date `{0}`")]
    Unrecognized(String),

    /// The text has the shape of a date but names an impossible day or time
    /// (e.g., `2025-02-30` or `2025-01-01 25:00`).
    #[error("invalid date `{0}`")]
    OutOfRange(String),
}

static BARE_DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:\s+(\d{1,2}):(\d{2}))?$").unwrap()
});

/// Offset-less ISO forms, read as wall time in the site's timezone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Normalizes a [`DateInput`] into an instant carrying the UTC+9 offset (or
/// the explicit offset the input declared).
pub fn normalize(input: &DateInput) -> Result<DateTime<FixedOffset>, DateError> {
    let text = match input {
        DateInput::Instant(instant) => return Ok(*instant),
        DateInput::Text(text) => text.trim(),
    };

    if let Some(caps) = BARE_DATE_TIME.captures(text) {
        let out_of_range = || DateError::OutOfRange(text.to_owned());
        let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d")
            .map_err(|_| out_of_range())?;
        let (hour, minute) = match (caps.get(2), caps.get(3)) {
            (Some(h), Some(m)) => (
                h.as_str().parse().map_err(|_| out_of_range())?,
                m.as_str().parse().map_err(|_| out_of_range())?,
            ),
            _ => (0, 0),
        };
        let time =
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(out_of_range)?;
        return local(NaiveDateTime::new(date, time)).ok_or_else(out_of_range);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant);
    }
    if let Ok(instant) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%:z") {
        return Ok(instant);
    }
    if let Ok(instant) = DateTime::parse_from_rfc2822(text) {
        return Ok(instant);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            if let Some(instant) = local(naive) {
                return Ok(instant);
            }
        }
    }

    Err(DateError::Unrecognized(text.to_owned()))
}

fn local(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    offset().from_local_datetime(&naive).single()
}

/// The current instant in the site's timezone.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset())
}

/// Midnight of the current calendar date in the site's timezone.
pub fn today() -> DateTime<FixedOffset> {
    midnight(now())
}

fn midnight(instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    local(instant.date_naive().and_time(NaiveTime::MIN)).unwrap_or(instant)
}

/// Renders a human-relative label (in Korean) for `instant` as seen from
/// `now`. Within the last 24 hours the label counts seconds, minutes or
/// hours; beyond that only calendar dates in the site's timezone are
/// compared.
pub fn relative_label(
    instant: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> String {
    let elapsed = now.signed_duration_since(instant);
    if elapsed >= Duration::zero() && elapsed < Duration::hours(24) {
        return if elapsed.num_seconds() < 60 {
            "방금 전".to_owned()
        } else if elapsed.num_minutes() < 60 {
            format!("{}분 전", elapsed.num_minutes())
        } else {
            format!("{}시간 전", elapsed.num_hours())
        };
    }

    let tz = offset();
    let days = now
        .with_timezone(&tz)
        .date_naive()
        .signed_duration_since(instant.with_timezone(&tz).date_naive())
        .num_days();

    match days {
        -1 => "내일".to_owned(),
        d if d < 0 => format!("{}일 후", -d),
        0 => "오늘".to_owned(),
        1 => "어제".to_owned(),
        d if d < 7 => format!("{}일 전", d),
        d if d < 30 => format!("{}주 전", d / 7),
        d if d < 365 => format!("{}개월 전", d / 30),
        d => format!("{}년 전", d / 365),
    }
}

/// Formats `instant` for display on a post page. Posts dated at midnight show
/// only the date; anything else also shows the time of day.
pub fn display(instant: DateTime<FixedOffset>) -> String {
    let local = instant.with_timezone(&offset());
    let date = local.format("%Y년 %-m월 %-d일").to_string();
    if local.hour() == 0 && local.minute() == 0 && local.second() == 0 {
        return date;
    }
    let (pm, hour) = local.hour12();
    format!(
        "{} {} {:02}:{:02} KST",
        date,
        if pm { "오후" } else { "오전" },
        hour,
        local.minute(),
    )
}

/// The machine-readable form of `instant` embedded in pages for client-side
/// relative-time rendering (UTC, millisecond precision).
pub fn iso_utc(instant: DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod test {
    use super::*;

    fn at(text: &str) -> DateTime<FixedOffset> {
        normalize(&DateInput::from(text)).unwrap()
    }

    #[test]
    fn test_bare_date_matches_explicit_forms() {
        let bare = at("2025-11-12");
        assert_eq!(bare, at("2025-11-12 00:00"));
        assert_eq!(bare, at("2025-11-12T00:00:00+09:00"));
        assert_eq!("2025-11-11T15:00:00.000Z", iso_utc(bare));
    }

    #[test]
    fn test_single_digit_hour() {
        assert_eq!(at("2025-11-12 8:30"), at("2025-11-12T08:30:00+09:00"));
    }

    #[test]
    fn test_explicit_offset_is_kept() {
        let instant = at("2025-11-12T08:30:00Z");
        assert_eq!(0, instant.offset().local_minus_utc());
        assert_eq!(at("2025-11-12 17:30"), instant);
    }

    #[test]
    fn test_offsetless_iso_is_site_local() {
        assert_eq!(at("2025-11-12T08:30:00"), at("2025-11-12 08:30"));
        assert_eq!(at("2025-11-12T08:30"), at("2025-11-12 08:30"));
        // wall time at UTC+9, not 08:30 UTC shifted forward
        assert_eq!("2025-11-11T23:30:00.000Z", iso_utc(at("2025-11-12T08:30:00")));
        assert_eq!(9 * 3600, at("2025-11-12T08:30").offset().local_minus_utc());
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            at("Wed, 12 Nov 2025 08:30:00 +0900"),
            at("2025-11-12 08:30")
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = at("2025-11-12 08:30");
        let twice = normalize(&DateInput::Instant(once)).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.offset(), twice.offset());
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(
            Err(DateError::Unrecognized("yesterday".to_owned())),
            normalize(&DateInput::from(" yesterday "))
        );
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            Err(DateError::OutOfRange("2025-02-30".to_owned())),
            normalize(&DateInput::from("2025-02-30"))
        );
        assert_eq!(
            Err(DateError::OutOfRange("2025-01-01 25:00".to_owned())),
            normalize(&DateInput::from("2025-01-01 25:00"))
        );
    }

    #[test]
    fn test_deserialize_scalars() {
        let input: DateInput = serde_yaml::from_str("2025-11-12").unwrap();
        assert_eq!(DateInput::from("2025-11-12"), input);
        let input: DateInput = serde_yaml::from_str("20251112").unwrap();
        assert_eq!(DateInput::from("20251112"), input);
        assert!(serde_yaml::from_str::<DateInput>("[1, 2]").is_err());
    }

    #[test]
    fn test_today_is_midnight() {
        let today = today();
        assert_eq!((0, 0, 0), (today.hour(), today.minute(), today.second()));
        assert_eq!(OFFSET_SECONDS, today.offset().local_minus_utc());
    }

    #[test]
    fn test_relative_label_recent() {
        let now = at("2025-11-12 15:00");
        assert_eq!("방금 전", relative_label(now - Duration::seconds(59), now));
        assert_eq!("30분 전", relative_label(now - Duration::minutes(30), now));
        assert_eq!("3시간 전", relative_label(now - Duration::hours(3), now));
    }

    #[test]
    fn test_relative_label_days() {
        let now = at("2025-11-12 15:00");
        assert_eq!("2일 전", relative_label(now - Duration::days(2), now));
        assert_eq!("내일", relative_label(now + Duration::days(1), now));
        assert_eq!("3일 후", relative_label(now + Duration::days(3), now));
        assert_eq!("어제", relative_label(at("2025-11-11 09:00"), now));
        assert_eq!("오늘", relative_label(at("2025-11-12 23:00"), now));
        assert_eq!("2주 전", relative_label(at("2025-10-29"), now));
        assert_eq!("2개월 전", relative_label(at("2025-09-01"), now));
        assert_eq!("1년 전", relative_label(at("2024-11-01"), now));
    }

    #[test]
    fn test_display() {
        assert_eq!("2025년 11월 2일", display(at("2025-11-02")));
        assert_eq!("2025년 11월 2일 오전 08:05 KST", display(at("2025-11-02 8:05")));
        assert_eq!("2025년 11월 2일 오후 03:30 KST", display(at("2025-11-02 15:30")));
    }
}
