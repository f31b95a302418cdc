//! A concrete date selection: one year, month or day, or an inclusive range
//! of same-granularity values.
//!
//! The parameter form is `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, optionally as a
//! range `A..B`. Choices order by range type, then by start, then by end
//! descending, which makes a more specific choice compare greater than the
//! broader one it was drilled from. Within one range type a narrower range
//! sharing a start sorts after the wider one.

use crate::domain::error::DomainError;
use crate::domain::values::date_range_type::{DateLevel, DateRangeType};
use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

static PATTERNS: Lazy<Vec<(DateRangeType, Regex)>> = Lazy::new(|| {
    DateRangeType::ALL
        .iter()
        .map(|&t| {
            let value = t.level().value_pattern();
            let pattern = if t.is_single() {
                format!(r"^({value})$")
            } else {
                format!(r"^({value})\.\.({value})$")
            };
            (t, Regex::new(&pattern).expect("date choice regex"))
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateChoice {
    range_type: DateRangeType,
    values: Vec<String>,
}

impl Ord for DateChoice {
    fn cmp(&self, other: &Self) -> Ordering {
        self.range_type
            .cmp(&other.range_type)
            .then_with(|| self.values.first().cmp(&other.values.first()))
            .then_with(|| other.values.get(1).cmp(&self.values.get(1)))
    }
}

impl PartialOrd for DateChoice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl DateChoice {
    /// Parses a request parameter. Fails on anything that is not one of the
    /// six shapes, does not name a real calendar date, or is a reversed range.
    pub fn parse(param: &str) -> Result<Self, DomainError> {
        let (range_type, values) = PATTERNS
            .iter()
            .find_map(|(t, re)| {
                re.captures(param).map(|caps| {
                    let values: Vec<String> = caps
                        .iter()
                        .skip(1)
                        .flatten()
                        .map(|m| m.as_str().to_string())
                        .collect();
                    (*t, values)
                })
            })
            .ok_or_else(|| DomainError::Parse(format!("Not a date choice: {param}")))?;

        let level = range_type.level();
        let mut dates = Vec::with_capacity(values.len());
        for v in &values {
            let date = parse_value(v)
                .ok_or_else(|| DomainError::Parse(format!("Not a calendar date: {v}")))?;
            dates.push(date);
        }
        if let [start, end] = dates.as_slice() {
            if start > end {
                return Err(DomainError::Parse(format!("Reversed date range: {param}")));
            }
        }

        let choice = DateChoice { range_type, values };
        // Rejects values whose exclusive end would fall outside the calendar.
        choice.to_lookup_bounds().map_err(|_| {
            DomainError::Parse(format!("Date out of range for {level}: {param}"))
        })?;
        Ok(choice)
    }

    /// Single-value choice for the period of `date` at `range_type`'s level.
    pub fn from_date(range_type: DateRangeType, date: NaiveDate) -> Self {
        let level = range_type.level();
        DateChoice {
            range_type: range_type.single(),
            values: vec![level.format(date)],
        }
    }

    /// Range choice at `range_type`'s level covering `start` to `end` inclusive.
    pub fn from_date_range(range_type: DateRangeType, start: NaiveDate, end: NaiveDate) -> Self {
        let level = range_type.level();
        DateChoice {
            range_type: range_type.group(),
            values: vec![level.format(start), level.format(end)],
        }
    }

    pub fn range_type(&self) -> DateRangeType {
        self.range_type
    }

    pub fn level(&self) -> DateLevel {
        self.range_type.level()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn to_param(&self) -> String {
        self.values.join("..")
    }

    /// First day covered by this choice.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.values.first().and_then(|v| parse_value(v))
    }

    /// Human-readable label: the year, the month name, or the day of month
    /// without padding. Ranges join both ends with `-`.
    pub fn display(&self) -> String {
        let level = self.level();
        self.values
            .iter()
            .map(|v| display_value(level, v))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Half-open bounds `[start, end)` that select exactly the records
    /// covered by this choice.
    pub fn to_lookup_bounds(&self) -> Result<(NaiveDate, NaiveDate), DomainError> {
        let (first, last) = match self.values.as_slice() {
            [single] => (single, single),
            [first, last] => (first, last),
            _ => {
                return Err(DomainError::InvalidInput(format!(
                    "Date choice has {} values",
                    self.values.len()
                )))
            }
        };
        let start = parse_value(first)
            .ok_or_else(|| DomainError::Parse(format!("Not a calendar date: {first}")))?;
        let end = parse_value(last)
            .ok_or_else(|| DomainError::Parse(format!("Not a calendar date: {last}")))?;
        let end = self
            .level()
            .add_units(end, 1)
            .ok_or_else(|| DomainError::InvalidInput(format!("Date out of range: {last}")))?;
        Ok((start, end))
    }
}

impl fmt::Display for DateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_param())
    }
}

impl FromStr for DateChoice {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateChoice::parse(s)
    }
}

/// `YYYY[-MM[-DD]]` to a date, filling missing parts with 1.
fn parse_value(value: &str) -> Option<NaiveDate> {
    let mut parts = [1u32; 3];
    let mut year = None;
    for (i, part) in value.split('-').enumerate() {
        if i == 0 {
            year = part.parse::<i32>().ok();
        } else if i < 3 {
            parts[i] = part.parse().ok()?;
        } else {
            return None;
        }
    }
    NaiveDate::from_ymd_opt(year?, parts[1], parts[2])
}

fn display_value(level: DateLevel, value: &str) -> String {
    let parts: Vec<&str> = value.split('-').collect();
    match level {
        DateLevel::Year => parts[0].to_string(),
        DateLevel::Month => parts
            .get(1)
            .and_then(|m| m.parse::<u8>().ok())
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| value.to_string()),
        DateLevel::Day => parts
            .last()
            .and_then(|d| d.parse::<u32>().ok())
            .map(|d| d.to_string())
            .unwrap_or_else(|| value.to_string()),
    }
}
