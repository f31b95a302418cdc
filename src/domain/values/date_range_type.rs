//! Granularities used by the date drill-down.
//!
//! A [`DateLevel`] is one of year, month or day. A [`DateRangeType`] pairs a
//! level with "single value" or "range of values" (a group). The six range
//! types are a closed set; their declaration order is the specificity order
//! `(level, single)`, so a group sorts before the single type of its level
//! and every type of a deeper level sorts after both.

use crate::domain::error::DomainError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLevel {
    Year = 1,
    Month = 2,
    Day = 3,
}

impl DateLevel {
    pub const ALL: [DateLevel; 3] = [DateLevel::Year, DateLevel::Month, DateLevel::Day];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(level: u8) -> Option<Self> {
        match level {
            1 => Some(DateLevel::Year),
            2 => Some(DateLevel::Month),
            3 => Some(DateLevel::Day),
            _ => None,
        }
    }

    /// Name of the date component this level truncates to.
    pub fn label(self) -> &'static str {
        match self {
            DateLevel::Year => "year",
            DateLevel::Month => "month",
            DateLevel::Day => "day",
        }
    }

    /// The component of `date` at this level (year, month of year, day of month).
    pub fn unit_value(self, date: NaiveDate) -> i32 {
        match self {
            DateLevel::Year => date.year(),
            DateLevel::Month => date.month() as i32,
            DateLevel::Day => date.day() as i32,
        }
    }

    /// `date` with its component at this level replaced by `value`.
    pub fn with_unit_value(self, date: NaiveDate, value: i32) -> Option<NaiveDate> {
        match self {
            DateLevel::Year => date.with_year(value),
            DateLevel::Month => u32::try_from(value).ok().and_then(|m| date.with_month(m)),
            DateLevel::Day => u32::try_from(value).ok().and_then(|d| date.with_day(d)),
        }
    }

    /// Calendar arithmetic: `date` advanced by `n` units of this level.
    pub fn add_units(self, date: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            DateLevel::Year => date.checked_add_months(Months::new(n.checked_mul(12)?)),
            DateLevel::Month => date.checked_add_months(Months::new(n)),
            DateLevel::Day => date.checked_add_days(Days::new(u64::from(n))),
        }
    }

    /// Truncates `date` to the first day of its period at this level.
    pub fn truncate(self, date: NaiveDate) -> NaiveDate {
        match self {
            DateLevel::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
            DateLevel::Month => date.with_day(1).unwrap_or(date),
            DateLevel::Day => date,
        }
    }

    /// Parameter encoding of `date` at this level: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub fn format(self, date: NaiveDate) -> String {
        match self {
            DateLevel::Year => format!("{:04}", date.year()),
            DateLevel::Month => format!("{:04}-{:02}", date.year(), date.month()),
            DateLevel::Day => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
        }
    }

    pub(crate) fn value_pattern(self) -> &'static str {
        match self {
            DateLevel::Year => r"\d{4}",
            DateLevel::Month => r"\d{4}-\d{2}",
            DateLevel::Day => r"\d{4}-\d{2}-\d{2}",
        }
    }
}

impl fmt::Display for DateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DateLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(DateLevel::Year),
            "month" => Ok(DateLevel::Month),
            "day" => Ok(DateLevel::Day),
            _ => Err(format!("Unknown date level: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateRangeType {
    YearGroup,
    Year,
    MonthGroup,
    Month,
    DayGroup,
    Day,
}

impl DateRangeType {
    pub const ALL: [DateRangeType; 6] = [
        DateRangeType::YearGroup,
        DateRangeType::Year,
        DateRangeType::MonthGroup,
        DateRangeType::Month,
        DateRangeType::DayGroup,
        DateRangeType::Day,
    ];

    /// Looks up the type registered for `(level, single)`.
    pub fn get(level: u8, single: bool) -> Result<Self, DomainError> {
        DateLevel::from_number(level)
            .map(|l| Self::of(l, single))
            .ok_or(DomainError::Lookup { level, single })
    }

    pub fn of(level: DateLevel, single: bool) -> Self {
        match (level, single) {
            (DateLevel::Year, false) => DateRangeType::YearGroup,
            (DateLevel::Year, true) => DateRangeType::Year,
            (DateLevel::Month, false) => DateRangeType::MonthGroup,
            (DateLevel::Month, true) => DateRangeType::Month,
            (DateLevel::Day, false) => DateRangeType::DayGroup,
            (DateLevel::Day, true) => DateRangeType::Day,
        }
    }

    pub fn level(self) -> DateLevel {
        match self {
            DateRangeType::YearGroup | DateRangeType::Year => DateLevel::Year,
            DateRangeType::MonthGroup | DateRangeType::Month => DateLevel::Month,
            DateRangeType::DayGroup | DateRangeType::Day => DateLevel::Day,
        }
    }

    pub fn is_single(self) -> bool {
        matches!(
            self,
            DateRangeType::Year | DateRangeType::Month | DateRangeType::Day
        )
    }

    pub fn label(self) -> &'static str {
        self.level().label()
    }

    /// The single-value type at the same level.
    pub fn single(self) -> Self {
        Self::of(self.level(), true)
    }

    /// The range type at the same level.
    pub fn group(self) -> Self {
        Self::of(self.level(), false)
    }

    /// Next type to query after a selection of this type, or `None` when
    /// a single day has been chosen.
    ///
    /// A range drills into single values of the same level; a single value
    /// drills into single values one level down. Ranges at the new level are
    /// produced by bucketing, never by drilldown.
    pub fn drilldown(self) -> Option<Self> {
        match self {
            DateRangeType::YearGroup => Some(DateRangeType::Year),
            DateRangeType::Year => Some(DateRangeType::Month),
            DateRangeType::MonthGroup => Some(DateRangeType::Month),
            DateRangeType::Month => Some(DateRangeType::Day),
            DateRangeType::DayGroup => Some(DateRangeType::Day),
            DateRangeType::Day => None,
        }
    }
}

impl fmt::Display for DateRangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_single() { "single" } else { "multi" };
        write!(f, "{} {kind}", self.label())
    }
}
