use chrono::Local;

use crate::models::CalendarDay;

/// Source of "today" for past/future filtering.
pub trait Clock: Send + Sync {
    fn today(&self) -> CalendarDay;
}

/// Local calendar date of the machine running the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDay {
        CalendarDay::from(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub CalendarDay);

impl Clock for FixedClock {
    fn today(&self) -> CalendarDay {
        self.0
    }
}
