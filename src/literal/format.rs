//! Canonical lexical forms

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Timelike};
use num_bigint::Sign;
use std::fmt::Write;

/// Remove trailing zeros from a fractional part, and the `.` if nothing remains
///
/// Text without a `.` is returned unchanged.
pub fn trim_zeros(text: &str) -> String {
    match text.find('.') {
        Some(_) => text.trim_end_matches('0').trim_end_matches('.').to_string(),
        None => text.to_string(),
    }
}

/// Four-digit zero-padded year, negative years lead with `-`
pub fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", i64::from(year).abs())
    } else {
        format!("{:04}", year)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    format!("{}-{:02}-{:02}", format_year(date.year()), date.month(), date.day())
}

/// `HH:MM:SS` plus trimmed fractional seconds
pub fn format_time(time: NaiveTime) -> String {
    // Leap seconds carry nanos past one second
    let nanos = time.nanosecond().min(999_999_999);
    let mut out = format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second());
    if nanos > 0 {
        out = trim_zeros(&format!("{}.{:09}", out, nanos));
    }
    out
}

pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-6..1e16).contains(&magnitude) {
        format!("{:E}", value)
    } else {
        format!("{}", value)
    }
}

pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-6..1e16).contains(&magnitude) {
        format!("{:E}", value)
    } else {
        format!("{}", value)
    }
}

/// Plain decimal text, never in exponent form
pub fn format_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let negative = digits.sign() == Sign::Minus;
    let magnitude = digits.magnitude().to_string();

    let mut out = String::with_capacity(magnitude.len() + 4);
    if negative {
        out.push('-');
    }
    if scale <= 0 {
        out.push_str(&magnitude);
        if magnitude != "0" {
            out.extend(std::iter::repeat('0').take(scale.unsigned_abs() as usize));
        }
        return out;
    }
    let scale = scale as usize;
    let padded = if magnitude.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - magnitude.len()), magnitude)
    } else {
        magnitude
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    out.push_str(int_part);
    out.push('.');
    out.push_str(frac_part);
    let trimmed = trim_zeros(&out);
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed
    }
}

/// `[-]P…Y…M`, zero is `P0M`
pub fn format_year_month_duration(total_months: i64) -> String {
    let mut out = String::new();
    if total_months < 0 {
        out.push('-');
    }
    out.push('P');
    let months = total_months.unsigned_abs();
    let (years, months) = (months / 12, months % 12);
    if years > 0 {
        let _ = write!(out, "{}Y", years);
    }
    if months > 0 || years == 0 {
        let _ = write!(out, "{}M", months);
    }
    out
}

/// `[-]P…DT…H…M…S`, zero is `PT0S`
pub fn format_day_time_duration(delta: TimeDelta) -> String {
    if delta.is_zero() {
        return "PT0S".to_string();
    }
    let negative = delta < TimeDelta::zero();
    let delta = if negative { -delta } else { delta };

    let total_seconds = delta.num_seconds();
    let nanos = delta.subsec_nanos();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        let _ = write!(out, "{}D", days);
    }
    if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{}H", hours);
        }
        if minutes > 0 {
            let _ = write!(out, "{}M", minutes);
        }
        if seconds > 0 || nanos > 0 {
            if nanos > 0 {
                out.push_str(&trim_zeros(&format!("{}.{:09}", seconds, nanos)));
            } else {
                let _ = write!(out, "{}", seconds);
            }
            out.push('S');
        }
    }
    out
}
