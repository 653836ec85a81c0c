//! Calendar values chrono has no type for
//!
//! XSD has partial dates (`gYear`, `gMonthDay`, ...), zoned times and
//! year-month periods; these are the host representations for them.

use chrono::{FixedOffset, Month, NaiveTime};
use std::fmt;

/// Time of day with a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl OffsetTime {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    /// The same instant expressed at offset zero
    pub fn to_utc(&self) -> NaiveTime {
        // NaiveTime arithmetic wraps around midnight
        self.time - chrono::TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))
    }
}

/// `xsd:gYear`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Year(pub i32);

/// `xsd:gYearMonth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }
}

/// `xsd:gMonthDay`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    pub month: Month,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: Month, day: u32) -> Self {
        Self { month, day }
    }
}

/// `xsd:gDay`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayOfMonth(pub u32);

/// Calendar period in years, months and days
///
/// Only periods with a zero day component are year-month durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl Period {
    pub fn new(years: i32, months: i32, days: i32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn of_months(months: i32) -> Self {
        Self::new(0, months, 0)
    }

    pub fn total_months(&self) -> i64 {
        i64::from(self.years) * 12 + i64::from(self.months)
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}Y{}M{}D", self.years, self.months, self.days)
    }
}
