//! Literal factory
//!
//! Builds canonical literals from host values. Every constructor tags the
//! literal with the matching XSD datatype and renders the canonical lexical
//! form for it:
//!
//! - float and double specials are `INF`, `-INF` and `NaN`
//! - zoned date/time values are normalized to UTC and carry `Z`
//! - fractional seconds are trimmed of trailing zeros (and of a bare `.`)
//! - years are padded to four digits
//!
//! `create_long` and `create_integer` differ only in the datatype; callers
//! choosing the coarse `xsd:integer` path do so for protocol uniformity.

mod calendar;
mod format;

pub use calendar::{DayOfMonth, MonthDay, OffsetTime, Period, Year, YearMonth};
pub use format::{
    format_date, format_day_time_duration, format_decimal, format_double, format_float,
    format_time, format_year, format_year_month_duration, trim_zeros,
};

use crate::error::{WireError, WireResult};
use crate::node::Literal;
use crate::vocab::xsd;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Month, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use num_bigint::BigInt;

pub fn create_boolean(value: bool) -> Literal {
    Literal::new(if value { "true" } else { "false" }, xsd::BOOLEAN)
}

pub fn create_byte(value: i8) -> Literal {
    Literal::new(value.to_string(), xsd::BYTE)
}

pub fn create_short(value: i16) -> Literal {
    Literal::new(value.to_string(), xsd::SHORT)
}

pub fn create_int(value: i32) -> Literal {
    Literal::new(value.to_string(), xsd::INT)
}

pub fn create_long(value: i64) -> Literal {
    Literal::new(value.to_string(), xsd::LONG)
}

/// `xsd:integer` from a 64-bit value
pub fn create_integer(value: i64) -> Literal {
    Literal::new(value.to_string(), xsd::INTEGER)
}

pub fn create_big_integer(value: &BigInt) -> Literal {
    Literal::new(value.to_string(), xsd::INTEGER)
}

pub fn create_unsigned_byte(value: u8) -> Literal {
    Literal::new(value.to_string(), xsd::UNSIGNED_BYTE)
}

pub fn create_unsigned_short(value: u16) -> Literal {
    Literal::new(value.to_string(), xsd::UNSIGNED_SHORT)
}

pub fn create_unsigned_int(value: u32) -> Literal {
    Literal::new(value.to_string(), xsd::UNSIGNED_INT)
}

pub fn create_unsigned_long(value: u64) -> Literal {
    Literal::new(value.to_string(), xsd::UNSIGNED_LONG)
}

pub fn create_float(value: f32) -> Literal {
    Literal::new(format_float(value), xsd::FLOAT)
}

pub fn create_double(value: f64) -> Literal {
    Literal::new(format_double(value), xsd::DOUBLE)
}

pub fn create_decimal(value: &BigDecimal) -> Literal {
    Literal::new(format_decimal(value), xsd::DECIMAL)
}

pub fn create_string(value: impl Into<String>) -> Literal {
    Literal::string(value)
}

pub fn create_lang_string(value: impl Into<String>, language: &str) -> WireResult<Literal> {
    Literal::lang_string(value, language)
}

pub fn create_any_uri(value: impl Into<String>) -> Literal {
    Literal::new(value, xsd::ANY_URI)
}

pub fn create_date(value: NaiveDate) -> Literal {
    Literal::new(format_date(value), xsd::DATE)
}

/// Zoneless `xsd:dateTime`
pub fn create_date_time(value: NaiveDateTime) -> Literal {
    Literal::new(local_date_time(value), xsd::DATE_TIME)
}

/// Zoned `xsd:dateTime`, normalized to UTC
pub fn create_offset_date_time<Tz: TimeZone>(value: &DateTime<Tz>) -> Literal {
    let utc = value.with_timezone(&Utc).naive_utc();
    Literal::new(format!("{}Z", local_date_time(utc)), xsd::DATE_TIME)
}

pub fn create_time(value: chrono::NaiveTime) -> Literal {
    Literal::new(format_time(value), xsd::TIME)
}

/// Zoned `xsd:time`, normalized to UTC
pub fn create_offset_time(value: OffsetTime) -> Literal {
    Literal::new(format!("{}Z", format_time(value.to_utc())), xsd::TIME)
}

pub fn create_year(value: Year) -> Literal {
    Literal::new(format_year(value.0), xsd::G_YEAR)
}

pub fn create_year_month(value: YearMonth) -> Literal {
    Literal::new(
        format!(
            "{}-{:02}",
            format_year(value.year),
            value.month.number_from_month()
        ),
        xsd::G_YEAR_MONTH,
    )
}

pub fn create_month(value: Month) -> Literal {
    Literal::new(
        format!("--{:02}", value.number_from_month()),
        xsd::G_MONTH,
    )
}

pub fn create_month_day(value: MonthDay) -> Literal {
    Literal::new(
        format!("--{:02}-{:02}", value.month.number_from_month(), value.day),
        xsd::G_MONTH_DAY,
    )
}

pub fn create_day(value: DayOfMonth) -> Literal {
    Literal::new(format!("---{:02}", value.0), xsd::G_DAY)
}

/// Fails with `InvalidArgument` when the period has a day component
pub fn create_year_month_duration(value: Period) -> WireResult<Literal> {
    if value.days != 0 {
        return Err(WireError::invalid_argument(format!(
            "period {} has a day component and is not a year-month duration",
            value
        )));
    }
    Ok(Literal::new(
        format_year_month_duration(value.total_months()),
        xsd::YEAR_MONTH_DURATION,
    ))
}

pub fn create_day_time_duration(value: TimeDelta) -> Literal {
    Literal::new(format_day_time_duration(value), xsd::DAY_TIME_DURATION)
}

fn local_date_time(value: NaiveDateTime) -> String {
    format!("{}T{}", format_date(value.date()), format_time(value.time()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime};
    use std::str::FromStr;

    #[test]
    fn test_integer_datatypes() {
        assert_eq!(create_byte(-8).datatype().as_str(), xsd::BYTE);
        assert_eq!(create_long(5).datatype().as_str(), xsd::LONG);
        assert_eq!(create_integer(5).datatype().as_str(), xsd::INTEGER);
        assert_eq!(create_unsigned_short(7).datatype().as_str(), xsd::UNSIGNED_SHORT);

        let big = BigInt::from_str("9223372036854775808").unwrap();
        let literal = create_big_integer(&big);
        assert_eq!(literal.lexical(), "9223372036854775808");
        assert_eq!(literal.datatype().as_str(), xsd::INTEGER);
    }

    #[test]
    fn test_float_specials() {
        assert_eq!(create_float(f32::INFINITY).lexical(), "INF");
        assert_eq!(create_float(f32::NEG_INFINITY).lexical(), "-INF");
        assert_eq!(create_float(f32::NAN).lexical(), "NaN");
        assert_eq!(create_double(f64::NEG_INFINITY).lexical(), "-INF");
        assert_eq!(create_double(2.5).lexical(), "2.5");
    }

    #[test]
    fn test_zoned_values_normalized_to_utc() {
        let zoned = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 1, 15, 0)
            .unwrap();
        assert_eq!(
            create_offset_date_time(&zoned).lexical(),
            "2024-02-29T23:15:00Z"
        );

        let time = OffsetTime::new(
            NaiveTime::from_hms_nano_opt(16, 25, 41, 123_450_000).unwrap(),
            FixedOffset::west_opt(3600).unwrap(),
        );
        assert_eq!(create_offset_time(time).lexical(), "17:25:41.12345Z");
    }

    #[test]
    fn test_local_values_stay_zoneless() {
        let dt = NaiveDate::from_ymd_opt(42, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 600)
            .unwrap();
        assert_eq!(create_date_time(dt).lexical(), "0042-01-02T03:04:05.6");
        assert_eq!(
            create_time(NaiveTime::from_hms_opt(16, 25, 0).unwrap()).lexical(),
            "16:25:00"
        );
    }

    #[test]
    fn test_partial_dates() {
        assert_eq!(create_year(Year(-44)).lexical(), "-0044");
        assert_eq!(create_year_month(YearMonth::new(2024, Month::May)).lexical(), "2024-05");
        assert_eq!(create_month(Month::December).lexical(), "--12");
        assert_eq!(create_month_day(MonthDay::new(Month::February, 29)).lexical(), "--02-29");
        assert_eq!(create_day(DayOfMonth(7)).lexical(), "---07");
    }

    #[test]
    fn test_year_month_duration_rejects_days() {
        assert_eq!(
            create_year_month_duration(Period::new(1, 2, 0)).unwrap().lexical(),
            "P1Y2M"
        );
        let err = create_year_month_duration(Period::new(0, 1, 3)).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
