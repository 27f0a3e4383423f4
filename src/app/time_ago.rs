use rand::Rng;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::WidgetError;

const RECENTLY: &str = "recently";

/// Label for a feed timestamp relative to `now`. A missing timestamp reads
/// "recently"; an unparseable one is replaced by a random time 5 to 125
/// minutes before `now`.
pub fn format_time_ago(timestamp: Option<&str>, now: OffsetDateTime) -> String {
    let Some(raw) = timestamp.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return RECENTLY.to_string();
    };

    let date = match parse_timestamp(raw) {
        Ok(date) => date,
        Err(err) => {
            tracing::debug!(error = %err, "substituting recent timestamp");
            synthetic_recent(now)
        }
    };

    relative_label(date, now)
}

pub fn relative_label(date: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - date).whole_seconds();

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        plural(seconds / 60, "minute")
    } else if seconds < 86_400 {
        plural(seconds / 3_600, "hour")
    } else {
        plural(seconds / 86_400, "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {} ago", count, unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Accepts `MM/DD/YYYY`, RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, and
/// the gviz `Date(y,m,d[,h,m,s])` form with a zero-based month. Values without
/// an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, WidgetError> {
    let raw = raw.trim();
    let malformed = || WidgetError::MalformedTimestamp(raw.to_string());

    if raw.contains('/') {
        return parse_us_date(raw).ok_or_else(malformed);
    }

    if let Some(args) = raw.strip_prefix("Date(").and_then(|rest| rest.strip_suffix(')')) {
        return parse_gviz_date(args).ok_or_else(malformed);
    }

    if let Ok(date) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(date);
    }

    let date_time = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(date) = PrimitiveDateTime::parse(raw, date_time) {
        return Ok(date.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, date_only) {
        return Ok(date.midnight().assume_utc());
    }

    Err(malformed())
}

fn parse_us_date(raw: &str) -> Option<OffsetDateTime> {
    // Sheets may append a time after the date: "1/15/2024 10:30:00".
    let date_part = raw.split_whitespace().next()?;
    let mut parts = date_part.split('/');
    let month: u8 = parts.next()?.trim().parse().ok()?;
    let day: u8 = parts.next()?.trim().parse().ok()?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let date = Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()?;
    Some(date.midnight().assume_utc())
}

fn parse_gviz_date(args: &str) -> Option<OffsetDateTime> {
    let fields = args
        .split(',')
        .map(|field| field.trim().parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if fields.len() < 3 {
        return None;
    }

    let field = |index: usize| fields.get(index).copied().unwrap_or(0);
    let month = Month::try_from(u8::try_from(field(1) + 1).ok()?).ok()?;
    let date = Date::from_calendar_date(i32::try_from(field(0)).ok()?, month, u8::try_from(field(2)).ok()?).ok()?;
    let time = Time::from_hms(
        u8::try_from(field(3)).ok()?,
        u8::try_from(field(4)).ok()?,
        u8::try_from(field(5)).ok()?,
    )
    .ok()?;

    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

fn synthetic_recent(now: OffsetDateTime) -> OffsetDateTime {
    let minutes = rand::thread_rng().gen_range(5..=125);
    now - Duration::minutes(minutes)
}
