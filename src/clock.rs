//! Source of "today" for loan dates, fines and overdue checks

use chrono::{Local, NaiveDate};

/// Clock used by the model to date loans and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Local wall-clock date
    #[default]
    System,
    /// Pinned date (tests, replays)
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}
