//! Source of "today" for date-defaulted todo actions.

use chrono::{Local, NaiveDate};

pub trait Clock {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
