//! Calendar-day clocks.
//!
//! The streak engine counts in calendar days, so every clock hands out a
//! `NaiveDate` with no time-of-day component. Which zone decides the date
//! is the clock's business, and must stay the same for the lifetime of a
//! user's record.

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Supplies the current calendar day.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Date in the system's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Date in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Parse a `YYYY-MM-DD` day.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDay`] for anything that is not a
    /// valid calendar date.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        parse_day(value).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Which zone the system clock uses to decide "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    #[default]
    Local,
    Utc,
}

impl ClockMode {
    pub fn system_clock(self) -> Box<dyn Clock + Send + Sync> {
        match self {
            ClockMode::Local => Box::new(LocalClock),
            ClockMode::Utc => Box::new(UtcClock),
        }
    }
}

/// Parse a strict `YYYY-MM-DD` calendar day.
///
/// # Errors
/// Returns [`ValidationError::InvalidDay`] on malformed input.
pub fn parse_day(value: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::InvalidDay {
        value: value.to_string(),
    };
    // chrono alone accepts padding, signs and single-digit fields.
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}
