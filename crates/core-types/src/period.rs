//! Calendar keys shared by budgets, cash-flow series and forecasts.
//!
//! Monthly keys are `YYYY-MM`, yearly keys are `YYYY`. Both serialize as plain
//! strings so they can travel through JSON payloads unchanged.

use crate::enums::BudgetType;
use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidPeriod(
                format!("{year:04}-{month:02}"),
                "month must be between 01 and 12".to_string(),
            ));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the key `months` months later (or earlier when negative).
    pub fn add_months(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Number of months from `self` to `other` (negative when `other` is earlier).
    pub fn months_until(&self, other: &MonthKey) -> i32 {
        (other.year - self.year) * 12 + (other.month as i32 - self.month as i32)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidPeriod(s.to_string(), reason.to_string());

        let (year, month) = s.split_once('-').ok_or_else(|| invalid("expected YYYY-MM"))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid("expected YYYY-MM"));
        }
        let year = parse_digits(year).ok_or_else(|| invalid("year is not numeric"))?;
        let month = parse_digits(month).ok_or_else(|| invalid("month is not numeric"))?;

        MonthKey::new(year as i32, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// The calendar span a budget definition covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetPeriod {
    Month(MonthKey),
    Year(i32),
}

impl BudgetPeriod {
    /// Parses a period key according to the cadence of the budget it belongs to.
    pub fn parse(budget_type: BudgetType, key: &str) -> Result<Self, CoreError> {
        match budget_type {
            BudgetType::Monthly => key.parse().map(BudgetPeriod::Month),
            BudgetType::Yearly => {
                if key.len() != 4 {
                    return Err(CoreError::InvalidPeriod(
                        key.to_string(),
                        "expected YYYY for a yearly budget".to_string(),
                    ));
                }
                parse_digits(key).map(|y| BudgetPeriod::Year(y as i32)).ok_or_else(|| {
                    CoreError::InvalidPeriod(key.to_string(), "year is not numeric".to_string())
                })
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            BudgetPeriod::Month(key) => key.contains(date),
            BudgetPeriod::Year(year) => date.year() == *year,
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetPeriod::Month(key) => key.fmt(f),
            BudgetPeriod::Year(year) => write!(f, "{year:04}"),
        }
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
