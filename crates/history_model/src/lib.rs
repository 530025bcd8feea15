use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod dates;
mod symbol;

pub use dates::{parse_date, parse_hyphen_date, parse_slash_date};
pub use symbol::{Symbol, SymbolError};

/// One closing price for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

/// Inclusive date range chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateWindow { from, to }
    }

    /// A window whose end precedes its start collapses to the start day.
    pub fn normalized(self) -> Self {
        if self.to < self.from {
            return DateWindow {
                from: self.from,
                to: self.from,
            };
        }
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// How much history the upstream provider is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookbackPeriod {
    Max,
    FiveYears,
    TwoYears,
    OneYear,
    YearToDate,
    SixMonths,
    ThreeMonths,
    OneMonth,
}

impl LookbackPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookbackPeriod::Max => "max",
            LookbackPeriod::FiveYears => "5y",
            LookbackPeriod::TwoYears => "2y",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::YearToDate => "ytd",
            LookbackPeriod::SixMonths => "6m",
            LookbackPeriod::ThreeMonths => "3m",
            LookbackPeriod::OneMonth => "1m",
        }
    }
}

impl fmt::Display for LookbackPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
