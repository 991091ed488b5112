use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use ical::IcalParser;
use regex::Regex;
use tracing::{debug, info, warn};

use super::{title_or_placeholder, RawEvent};
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::timezone::RawInstant;

/// Duration assumed for events that carry no usable duration information
pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

fn duration_regex() -> &'static Regex {
    static DURATION: OnceLock<Regex> = OnceLock::new();
    DURATION.get_or_init(|| {
        Regex::new(r"^([+-])?P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
            .expect("duration pattern is valid")
    })
}

/// A DTSTART/DTEND value
#[derive(Debug, Clone, PartialEq)]
enum DateOrDateTime {
    Date(NaiveDate),
    DateTime(RawInstant),
}

/// Read and parse an iCalendar file.
///
/// An unreadable file and an unparsable document are reported as different errors.
pub fn read_events(path: &Path) -> AnalyzerResult<Vec<RawEvent>> {
    let bytes = fs::read(path).map_err(|source| AnalyzerError::CalendarRead {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        warn!("{:?} is not valid UTF-8, invalid bytes were replaced", path);
    }

    let events = parse_events(&content).map_err(|message| AnalyzerError::CalendarParse {
        path: path.to_path_buf(),
        message,
    })?;
    info!("Parsed {} timed events from {:?}", events.len(), path);
    Ok(events)
}

/// Timed events of every VCALENDAR in `content`, in document order.
pub fn parse_events(content: &str) -> Result<Vec<RawEvent>, String> {
    let parser = IcalParser::new(content.as_bytes());
    let mut calendars = 0usize;
    let mut events = Vec::new();

    for calendar in parser {
        let calendar = calendar.map_err(|e| e.to_string())?;
        calendars += 1;

        for event in &calendar.events {
            if let Some(raw) = convert_event(event) {
                events.push(raw);
            }
        }
    }

    if calendars == 0 {
        return Err("no VCALENDAR component found".to_string());
    }
    Ok(events)
}

fn convert_event(event: &IcalEvent) -> Option<RawEvent> {
    let Some(dtstart) = find_property(event, "DTSTART") else {
        warn!("Skipping event without DTSTART");
        return None;
    };

    let start = match parse_date_value(dtstart) {
        Ok(DateOrDateTime::DateTime(instant)) => instant.normalize(),
        Ok(DateOrDateTime::Date(date)) => {
            debug!("Skipping all-day event on {}", date);
            return None;
        }
        Err(e) => {
            warn!("Skipping event with unreadable DTSTART: {}", e);
            return None;
        }
    };

    let duration_hours = event_duration_hours(event, &start).unwrap_or(DEFAULT_DURATION_HOURS);
    let summary = find_property(event, "SUMMARY")
        .and_then(|p| p.value.as_deref())
        .map(unescape_text);

    Some(RawEvent {
        start,
        duration_hours,
        title: title_or_placeholder(summary.as_deref()),
    })
}

/// Hours from DURATION, else from DTEND. `None` when neither gives a usable value.
fn event_duration_hours(event: &IcalEvent, start: &DateTime<Tz>) -> Option<f64> {
    if let Some(value) = find_property(event, "DURATION").and_then(|p| p.value.as_deref()) {
        match parse_duration(value) {
            Some(duration) if duration >= Duration::zero() => return Some(hours(duration)),
            _ => warn!("Ignoring unusable DURATION value {:?}", value),
        }
    }

    let dtend = find_property(event, "DTEND")?;
    match parse_date_value(dtend) {
        Ok(DateOrDateTime::DateTime(end)) => {
            let duration = end.normalize().signed_duration_since(*start);
            if duration >= Duration::zero() {
                Some(hours(duration))
            } else {
                warn!("Ignoring DTEND before DTSTART");
                None
            }
        }
        Ok(DateOrDateTime::Date(_)) => None,
        Err(e) => {
            warn!("Ignoring unreadable DTEND: {}", e);
            None
        }
    }
}

fn hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

fn find_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event
        .properties
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

fn find_param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(|value| value.trim_matches('"'))
}

fn parse_date_value(property: &Property) -> Result<DateOrDateTime, String> {
    let value = property
        .value
        .as_deref()
        .map(str::trim)
        .ok_or_else(|| format!("{} has no value", property.name))?;

    let date_only = find_param(property, "VALUE").map_or(false, |v| v.eq_ignore_ascii_case("DATE"));
    if date_only || !value.contains('T') {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d")
            .map_err(|e| format!("invalid date {:?}: {}", value, e))?;
        return Ok(DateOrDateTime::Date(date));
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = parse_naive(utc)?;
        return Ok(DateOrDateTime::DateTime(RawInstant::Utc(Utc.from_utc_datetime(&naive))));
    }

    let naive = parse_naive(value)?;
    let Some(tzid) = find_param(property, "TZID") else {
        return Ok(DateOrDateTime::DateTime(RawInstant::Floating(naive)));
    };

    match tzid.trim_start_matches('/').parse::<Tz>() {
        Ok(tz) => match tz.from_local_datetime(&naive).earliest() {
            Some(local) => Ok(DateOrDateTime::DateTime(RawInstant::Zoned(local))),
            None => {
                warn!("{} does not exist in {}, reading it as UTC", naive, tzid);
                Ok(DateOrDateTime::DateTime(RawInstant::Floating(naive)))
            }
        },
        Err(_) => {
            warn!("Unknown TZID {:?}, reading {} as UTC", tzid, naive);
            Ok(DateOrDateTime::DateTime(RawInstant::Floating(naive)))
        }
    }
}

fn parse_naive(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .map_err(|e| format!("invalid date-time {:?}: {}", value, e))
}

/// Parse an RFC 5545 duration such as `PT1H30M`, `P1D` or `-PT15M`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let captures = duration_regex().captures(value.trim())?;

    let mut duration = Duration::zero();
    let mut any_component = false;
    let units: [(usize, fn(i64) -> Option<Duration>); 5] = [
        (2, Duration::try_weeks),
        (3, Duration::try_days),
        (4, Duration::try_hours),
        (5, Duration::try_minutes),
        (6, Duration::try_seconds),
    ];
    for (group, unit) in units {
        if let Some(digits) = captures.get(group) {
            let amount: i64 = digits.as_str().parse().ok()?;
            // Out of range amounts make the whole value unusable
            duration = duration.checked_add(&unit(amount)?)?;
            any_component = true;
        }
    }

    if !any_component {
        return None;
    }
    if captures.get(1).map(|sign| sign.as_str()) == Some("-") {
        duration = -duration;
    }
    Some(duration)
}

/// Undo RFC 5545 TEXT escaping. Unknown escapes are kept as written.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(';') => out.push(';'),
            Some(',') => out.push(','),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
