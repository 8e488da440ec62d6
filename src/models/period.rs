//! Calendar period (year-month) used to key salary payments and
//! controller earnings runs.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A calendar month, the unit of payroll settlement.
///
/// Periods key [`SalaryPayment`](super::SalaryPayment) rows (exactly one
/// per teacher per period) and drive controller earnings runs. The
/// canonical text form is `YYYY-MM`.
///
/// # Example
///
/// ```
/// use salary_engine::models::Period;
///
/// let period: Period = "2025-11".parse().unwrap();
/// assert_eq!(period, Period { year: 2025, month: 11 });
/// assert_eq!(period.to_string(), "2025-11");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 through 12.
    pub month: u32,
}

impl Period {
    /// Returns the first day of the month, or `None` if the period does
    /// not describe a real calendar month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Returns the last day of the month, or `None` if the period does
    /// not describe a real calendar month.
    pub fn last_day(&self) -> Option<NaiveDate> {
        let next_first = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next_first.and_then(|d| d.pred_opt())
    }

    /// Checks whether a date falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Returns the immediately preceding period (the growth baseline).
    pub fn prev(&self) -> Period {
        if self.month == 1 {
            Period {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::ValidationError {
            field: "period".to_string(),
            message: format!("expected YYYY-MM, got '{s}'"),
        };
        let (year_part, month_part) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        let period = Period { year, month };
        if period.first_day().is_none() {
            return Err(invalid());
        }
        Ok(period)
    }
}
