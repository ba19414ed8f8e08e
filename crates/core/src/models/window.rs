use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// `09.04.2025` — as-of date for the monthly category report.
pub const DAY_FIRST_DATE: &str = "%d.%m.%Y";
/// `2025-04-09` — start/cutoff dates.
pub const ISO_DATE: &str = "%Y-%m-%d";
/// `2025-04-09 14:30:00` — reference moments for the home page and rolling reports.
pub const ISO_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// How a concrete window is derived from a reference moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPolicy {
    /// First day of the reference month (same time of day) up to the reference moment
    MonthToDate,
    /// `days` before the reference moment up to the reference moment
    Rolling(u32),
    /// The reference moment up to `days` after it
    Forward(u32),
    /// Everything on or before the reference calendar day
    Cutoff,
}

impl WindowPolicy {
    pub const ROLLING_90: WindowPolicy = WindowPolicy::Rolling(90);
    pub const FORWARD_90: WindowPolicy = WindowPolicy::Forward(90);
}

impl std::fmt::Display for WindowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowPolicy::MonthToDate => write!(f, "month_to_date"),
            WindowPolicy::Rolling(days) => write!(f, "rolling_{days}"),
            WindowPolicy::Forward(days) => write!(f, "forward_{days}"),
            WindowPolicy::Cutoff => write!(f, "cutoff"),
        }
    }
}

/// Inclusive time interval used to filter transactions.
///
/// `start == None` means the window is open towards the past.
/// Invariant: `start <= end` whenever `start` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    pub start: Option<NaiveDateTime>,
    pub end: NaiveDateTime,
}

/// Unchecked wire form; deserialized windows go through `DateWindow::between`.
#[derive(Deserialize)]
struct WindowBounds {
    #[serde(default)]
    start: Option<NaiveDateTime>,
    end: NaiveDateTime,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = CoreError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        match bounds.start {
            Some(start) => Self::between(start, bounds.end),
            None => Ok(Self::until(bounds.end)),
        }
    }
}

impl DateWindow {
    /// Exact bounds, both inclusive.
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidWindow(format!(
                "start ({start}) must not be after end ({end})"
            )));
        }
        Ok(Self {
            start: Some(start),
            end,
        })
    }

    /// Open-started window ending at `end` (inclusive).
    pub fn until(end: NaiveDateTime) -> Self {
        Self { start: None, end }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start.map_or(true, |start| timestamp >= start) && timestamp <= self.end
    }
}

/// Compute the concrete window for `reference` under `policy`.
pub fn select_window(
    reference: NaiveDateTime,
    policy: WindowPolicy,
) -> Result<DateWindow, CoreError> {
    let overflow =
        || CoreError::InvalidWindow(format!("{policy} window around {reference} is out of range"));

    let window = match policy {
        WindowPolicy::MonthToDate => {
            let start = reference.with_day(1).ok_or_else(overflow)?;
            DateWindow::between(start, reference)?
        }
        WindowPolicy::Rolling(days) => {
            let start = reference
                .checked_sub_signed(Duration::days(i64::from(days)))
                .ok_or_else(overflow)?;
            DateWindow::between(start, reference)?
        }
        WindowPolicy::Forward(days) => {
            let end = reference
                .checked_add_signed(Duration::days(i64::from(days)))
                .ok_or_else(overflow)?;
            DateWindow::between(reference, end)?
        }
        WindowPolicy::Cutoff => DateWindow::until(end_of_day(reference.date())),
    };

    log::debug!(
        "Selected {policy} window: {:?} ..= {}",
        window.start,
        window.end
    );
    Ok(window)
}

/// Parse a reference date against the format a report expects.
///
/// Date-only formats yield midnight. Anything that does not match `format`
/// is an error; there is no fallback to "now".
pub fn parse_reference(input: &str, format: &str) -> Result<NaiveDateTime, CoreError> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, format)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, format).map(midnight))
        .map_err(|_| CoreError::InvalidDate {
            input: input.to_string(),
            expected: format.to_string(),
        })
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or_default();
    date.and_time(last)
}
