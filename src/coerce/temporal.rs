//! Date, time, partial-date and duration reads
//!
//! Zoneless and zoned reads are separate entry points: a zoned lexical form
//! never silently loses its offset, and a zoneless one never gains UTC.

use super::{marshal_error, mismatch, HostValue};
use crate::error::{LexicalError, WireResult};
use crate::literal::{DayOfMonth, MonthDay, OffsetTime, Period, Year, YearMonth};
use crate::node::Node;
use crate::vocab::xsd;
use chrono::{DateTime, FixedOffset, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use std::sync::OnceLock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

fn duration_regex() -> &'static Regex {
    static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    DURATION_REGEX.get_or_init(|| {
        Regex::new(
            r"^(-)?P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.(\d+))?S)?)?$",
        )
        .expect("Invalid regex")
    })
}

/// Split a trailing `Z` or `±HH:MM` off a lexical form
fn split_offset(lexical: &str) -> Result<(&str, Option<FixedOffset>), LexicalError> {
    if let Some(body) = lexical.strip_suffix('Z') {
        return Ok((body, FixedOffset::east_opt(0)));
    }
    let tail = lexical
        .len()
        .checked_sub(6)
        .and_then(|start| lexical.get(start..));
    if let Some(tail) = tail {
        let tb = tail.as_bytes();
        if matches!(tb[0], b'+' | b'-') && tb[3] == b':' {
            let hours: i32 = tail[1..3]
                .parse()
                .map_err(|_| LexicalError::new(format!("invalid offset {:?}", tail)))?;
            let minutes: i32 = tail[4..6]
                .parse()
                .map_err(|_| LexicalError::new(format!("invalid offset {:?}", tail)))?;
            let sign = if tb[0] == b'-' { -1 } else { 1 };
            let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
                .filter(|_| hours <= 14 && minutes < 60)
                .ok_or_else(|| LexicalError::new(format!("offset out of range {:?}", tail)))?;
            return Ok((&lexical[..lexical.len() - 6], Some(offset)));
        }
    }
    Ok((lexical, None))
}

/// Lexical form of a literal with one of the accepted datatypes (or a plain string)
fn temporal_lexical<'a>(node: &'a Node, target: &str, accepted: &[&str]) -> WireResult<&'a str> {
    match node.as_literal() {
        Some(literal)
            if accepted.contains(&literal.datatype().as_str())
                || xsd::is_string_like(literal.datatype().as_str()) =>
        {
            Ok(literal.lexical().trim())
        }
        _ => Err(mismatch(node, target)),
    }
}

fn zoned(node: &Node, target: &str) -> crate::error::WireError {
    marshal_error(node, target, LexicalError::new("value carries a zone offset"))
}

fn zoneless(node: &Node, target: &str) -> crate::error::WireError {
    marshal_error(node, target, LexicalError::new("value has no zone offset"))
}

/// Date and time parts of a date or dateTime lexical form
fn parse_date_or_date_time(body: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    if body.contains('T') {
        NaiveDateTime::parse_from_str(body, DATE_TIME_FORMAT)
    } else {
        NaiveDate::parse_from_str(body, DATE_FORMAT).map(|d| d.and_time(NaiveTime::default()))
    }
}

pub(crate) fn read_local_date(node: &Node) -> WireResult<NaiveDate> {
    const TARGET: &str = "NaiveDate";
    let lexical = temporal_lexical(node, TARGET, &[xsd::DATE, xsd::DATE_TIME])?;
    let (body, offset) = split_offset(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    if offset.is_some() {
        return Err(zoned(node, TARGET));
    }
    parse_date_or_date_time(body)
        .map(|dt| dt.date())
        .map_err(|e| marshal_error(node, TARGET, e))
}

pub(crate) fn read_local_date_time(node: &Node) -> WireResult<NaiveDateTime> {
    const TARGET: &str = "NaiveDateTime";
    let lexical = temporal_lexical(
        node,
        TARGET,
        &[xsd::DATE_TIME, xsd::DATE_TIME_STAMP, xsd::DATE],
    )?;
    let (body, offset) = split_offset(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    if offset.is_some() {
        return Err(zoned(node, TARGET));
    }
    parse_date_or_date_time(body).map_err(|e| marshal_error(node, TARGET, e))
}

pub(crate) fn read_local_time(node: &Node) -> WireResult<NaiveTime> {
    const TARGET: &str = "NaiveTime";
    let lexical = temporal_lexical(node, TARGET, &[xsd::TIME])?;
    let (body, offset) = split_offset(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    if offset.is_some() {
        return Err(zoned(node, TARGET));
    }
    NaiveTime::parse_from_str(body, TIME_FORMAT).map_err(|e| marshal_error(node, TARGET, e))
}

/// Zoned dateTime; a zoned date reads as midnight at its offset
pub(crate) fn read_offset_date_time(node: &Node) -> WireResult<DateTime<FixedOffset>> {
    const TARGET: &str = "DateTime<FixedOffset>";
    let lexical = temporal_lexical(
        node,
        TARGET,
        &[xsd::DATE_TIME, xsd::DATE_TIME_STAMP, xsd::DATE],
    )?;
    let (body, offset) = split_offset(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    let offset = offset.ok_or_else(|| zoneless(node, TARGET))?;
    let local = parse_date_or_date_time(body).map_err(|e| marshal_error(node, TARGET, e))?;
    local
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| marshal_error(node, TARGET, LexicalError::new("ambiguous local time")))
}

pub(crate) fn read_offset_time(node: &Node) -> WireResult<OffsetTime> {
    const TARGET: &str = "OffsetTime";
    let lexical = temporal_lexical(node, TARGET, &[xsd::TIME])?;
    let (body, offset) = split_offset(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    let offset = offset.ok_or_else(|| zoneless(node, TARGET))?;
    NaiveTime::parse_from_str(body, TIME_FORMAT)
        .map(|time| OffsetTime::new(time, offset))
        .map_err(|e| marshal_error(node, TARGET, e))
}

enum Shape {
    Date,
    DateTime,
    Time,
}

/// Zoned form when the lexical form carries an offset, zoneless otherwise
pub(crate) fn read_best_date_time(node: &Node) -> WireResult<HostValue> {
    const TARGET: &str = "date/time";
    let literal = node.as_literal().ok_or_else(|| mismatch(node, TARGET))?;
    let (body, offset) =
        split_offset(literal.lexical().trim()).map_err(|e| marshal_error(node, TARGET, e))?;
    let shape = match literal.datatype().as_str() {
        xsd::DATE => Shape::Date,
        xsd::TIME => Shape::Time,
        xsd::DATE_TIME | xsd::DATE_TIME_STAMP => Shape::DateTime,
        dt if xsd::is_string_like(dt) && body.contains('T') => Shape::DateTime,
        dt if xsd::is_string_like(dt) && body.contains(':') => Shape::Time,
        dt if xsd::is_string_like(dt) => Shape::Date,
        _ => return Err(mismatch(node, TARGET)),
    };
    match (shape, offset.is_some()) {
        (Shape::Time, true) => read_offset_time(node).map(HostValue::OffsetTime),
        (Shape::Time, false) => read_local_time(node).map(HostValue::Time),
        (Shape::Date, false) => read_local_date(node).map(HostValue::Date),
        (Shape::DateTime, false) => read_local_date_time(node).map(HostValue::DateTime),
        (_, true) => read_offset_date_time(node).map(HostValue::OffsetDateTime),
    }
}

/// Milliseconds since the epoch; zoneless values are taken as UTC
pub(crate) fn read_epoch_millis(node: &Node) -> WireResult<i64> {
    match read_best_date_time(node)? {
        HostValue::OffsetDateTime(dt) => Ok(dt.timestamp_millis()),
        HostValue::DateTime(dt) => Ok(dt.and_utc().timestamp_millis()),
        HostValue::Date(d) => Ok(d.and_time(NaiveTime::default()).and_utc().timestamp_millis()),
        _ => Err(marshal_error(
            node,
            "epoch millis",
            LexicalError::new("a time of day has no date"),
        )),
    }
}

fn parse_year(text: &str) -> Result<i32, LexicalError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.len() < 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LexicalError::new(format!("invalid year {:?}", text)));
    }
    text.parse()
        .map_err(|e| LexicalError::new(format!("{}: {:?}", e, text)))
}

fn parse_two_digits(text: &str, what: &str, range: std::ops::RangeInclusive<u32>) -> Result<u32, LexicalError> {
    let value = if text.len() == 2 && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse::<u32>().ok()
    } else {
        None
    };
    value
        .filter(|v| range.contains(v))
        .ok_or_else(|| LexicalError::new(format!("invalid {} {:?}", what, text)))
}

fn parse_month(text: &str) -> Result<Month, LexicalError> {
    let number = parse_two_digits(text, "month", 1..=12)?;
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .ok_or_else(|| LexicalError::new(format!("invalid month {:?}", text)))
}

/// Body of a g* lexical form; a trailing offset is accepted and ignored
fn gregorian_body<'a>(node: &'a Node, target: &str, datatype: &str) -> WireResult<&'a str> {
    let lexical = temporal_lexical(node, target, &[datatype])?;
    split_offset(lexical)
        .map(|(body, _)| body)
        .map_err(|e| marshal_error(node, target, e))
}

pub(crate) fn read_year(node: &Node) -> WireResult<Year> {
    const TARGET: &str = "Year";
    let body = gregorian_body(node, TARGET, xsd::G_YEAR)?;
    parse_year(body)
        .map(Year)
        .map_err(|e| marshal_error(node, TARGET, e))
}

pub(crate) fn read_year_month(node: &Node) -> WireResult<YearMonth> {
    const TARGET: &str = "YearMonth";
    let body = gregorian_body(node, TARGET, xsd::G_YEAR_MONTH)?;
    let parsed = body
        .rsplit_once('-')
        .ok_or_else(|| LexicalError::new(format!("invalid gYearMonth {:?}", body)))
        .and_then(|(year, month)| Ok(YearMonth::new(parse_year(year)?, parse_month(month)?)));
    parsed.map_err(|e| marshal_error(node, TARGET, e))
}

pub(crate) fn read_month(node: &Node) -> WireResult<Month> {
    const TARGET: &str = "Month";
    let body = gregorian_body(node, TARGET, xsd::G_MONTH)?;
    let parsed = body
        .strip_prefix("--")
        .ok_or_else(|| LexicalError::new(format!("gMonth needs two leading dashes: {:?}", body)))
        .and_then(parse_month);
    parsed.map_err(|e| marshal_error(node, TARGET, e))
}

pub(crate) fn read_month_day(node: &Node) -> WireResult<MonthDay> {
    const TARGET: &str = "MonthDay";
    let body = gregorian_body(node, TARGET, xsd::G_MONTH_DAY)?;
    let parsed = body
        .strip_prefix("--")
        .and_then(|rest| rest.split_once('-'))
        .ok_or_else(|| LexicalError::new(format!("invalid gMonthDay {:?}", body)))
        .and_then(|(month, day)| {
            Ok(MonthDay::new(
                parse_month(month)?,
                parse_two_digits(day, "day", 1..=31)?,
            ))
        });
    parsed.map_err(|e| marshal_error(node, TARGET, e))
}

pub(crate) fn read_day(node: &Node) -> WireResult<DayOfMonth> {
    const TARGET: &str = "DayOfMonth";
    let body = gregorian_body(node, TARGET, xsd::G_DAY)?;
    let parsed = body
        .strip_prefix("---")
        .ok_or_else(|| LexicalError::new(format!("gDay needs three leading dashes: {:?}", body)))
        .and_then(|day| parse_two_digits(day, "day", 1..=31));
    parsed
        .map(DayOfMonth)
        .map_err(|e| marshal_error(node, TARGET, e))
}

struct DurationParts {
    negative: bool,
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    nanos: u32,
    has_date_part: bool,
    has_time_part: bool,
}

fn parse_duration(lexical: &str) -> Result<DurationParts, LexicalError> {
    let invalid = || LexicalError::new(format!("invalid duration {:?}", lexical));
    if lexical.ends_with('P') || lexical.ends_with('T') {
        return Err(invalid());
    }
    let caps = duration_regex().captures(lexical).ok_or_else(invalid)?;
    let number = |i: usize| -> Result<i64, LexicalError> {
        caps.get(i)
            .map(|m| m.as_str().parse::<i64>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };
    let nanos = match caps.get(8) {
        Some(m) => {
            let mut digits: String = m.as_str().chars().take(9).collect();
            while digits.len() < 9 {
                digits.push('0');
            }
            digits.parse::<u32>().map_err(|_| invalid())?
        }
        None => 0,
    };
    Ok(DurationParts {
        negative: caps.get(1).is_some(),
        years: number(2)?,
        months: number(3)?,
        days: number(4)?,
        hours: number(5)?,
        minutes: number(6)?,
        seconds: number(7)?,
        nanos,
        has_date_part: caps.get(2).is_some() || caps.get(3).is_some(),
        has_time_part: (4..=7).any(|i| caps.get(i).is_some()),
    })
}

pub(crate) fn read_year_month_duration(node: &Node) -> WireResult<Period> {
    const TARGET: &str = "Period";
    let lexical = temporal_lexical(node, TARGET, &[xsd::YEAR_MONTH_DURATION, xsd::DURATION])?;
    let parts = parse_duration(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    if parts.has_time_part {
        return Err(marshal_error(
            node,
            TARGET,
            LexicalError::new("duration has day or time components"),
        ));
    }
    let sign = if parts.negative { -1 } else { 1 };
    let years = i32::try_from(parts.years).map_err(|e| marshal_error(node, TARGET, e))?;
    let months = i32::try_from(parts.months).map_err(|e| marshal_error(node, TARGET, e))?;
    Ok(Period::new(sign * years, sign * months, 0))
}

pub(crate) fn read_day_time_duration(node: &Node) -> WireResult<TimeDelta> {
    const TARGET: &str = "TimeDelta";
    let lexical = temporal_lexical(node, TARGET, &[xsd::DAY_TIME_DURATION, xsd::DURATION])?;
    let parts = parse_duration(lexical).map_err(|e| marshal_error(node, TARGET, e))?;
    if parts.has_date_part {
        return Err(marshal_error(
            node,
            TARGET,
            LexicalError::new("duration has year or month components"),
        ));
    }
    let overflow = || marshal_error(node, TARGET, LexicalError::new("duration out of range"));
    let seconds = parts
        .days
        .checked_mul(86_400)
        .and_then(|s| s.checked_add(parts.hours.checked_mul(3_600)?))
        .and_then(|s| s.checked_add(parts.minutes.checked_mul(60)?))
        .and_then(|s| s.checked_add(parts.seconds))
        .ok_or_else(overflow)?;
    let delta = TimeDelta::new(seconds, parts.nanos).ok_or_else(overflow)?;
    Ok(if parts.negative { -delta } else { delta })
}
