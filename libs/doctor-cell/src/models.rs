use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid calendar day (expected yyyy-MM-dd): {0}")]
    InvalidDay(String),

    #[error("Invalid month (expected yyyy-MM): {0}")]
    InvalidMonth(String),

    #[error("Invalid slot time (expected ISO 8601 date-time): {0}")]
    InvalidSlotTime(String),
}

/// Opaque doctor identifier owned by the remote system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(String);

impl DoctorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DoctorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A date without time of day. Ordering matches the lexicographic order of
/// its `yyyy-MM-dd` form, so past/future checks never touch instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn iso(&self) -> String {
        self.0.format(Self::FORMAT).to_string()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth(self.0.with_day(1).unwrap_or(self.0))
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDay {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| ModelError::InvalidDay(s.to_string()))
    }
}

impl TryFrom<String> for CalendarDay {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDay> for String {
    fn from(day: CalendarDay) -> Self {
        day.iso()
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Calendar month, rendered as `yyyy-MM`. Held as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> CalendarDay {
        CalendarDay(self.0)
    }

    pub fn last_day(&self) -> CalendarDay {
        let last = self
            .0
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.0);
        CalendarDay(last)
    }

    /// Every day of the month, first to last inclusive.
    pub fn days(&self) -> Vec<CalendarDay> {
        let last = self.last_day();
        let mut days = Vec::with_capacity(31);
        let mut current = Some(self.first_day());

        while let Some(day) = current.filter(|d| *d <= last) {
            days.push(day);
            current = day.succ();
        }

        days
    }

    pub fn next(&self) -> Self {
        Self(self.0.checked_add_months(Months::new(1)).unwrap_or(self.0))
    }

    pub fn previous(&self) -> Self {
        Self(self.0.checked_sub_months(Months::new(1)).unwrap_or(self.0))
    }
}

impl FromStr for YearMonth {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Cache key for a doctor's month. Distinct doctors or months never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthKey {
    pub doctor_id: DoctorId,
    pub month: YearMonth,
}

impl MonthKey {
    pub fn new(doctor_id: DoctorId, month: YearMonth) -> Self {
        Self { doctor_id, month }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.doctor_id, self.month)
    }
}

/// A bookable instant as reported by the slot directory. The time string is
/// kept exactly as received; it is the identity used at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "horario")]
    pub time: String,
    #[serde(rename = "disponivel")]
    pub available: bool,
}

impl Slot {
    pub fn new(time: impl Into<String>, available: bool) -> Self {
        Self {
            time: time.into(),
            available,
        }
    }

    /// Calendar day the slot falls on. Offset-qualified times are read in
    /// local time; naive times are taken as-is.
    pub fn day(&self) -> Result<CalendarDay, ModelError> {
        slot_day(&self.time)
    }
}

pub fn slot_day(time: &str) -> Result<CalendarDay, ModelError> {
    let trimmed = time.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(CalendarDay(instant.with_timezone(&Local).date_naive()));
    }

    trimmed
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map(|naive| CalendarDay(naive.date()))
        .map_err(|_| ModelError::InvalidSlotTime(time.to_string()))
}

/// Outcome of looking up one doctor-day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayResult {
    Slots(Vec<Slot>),
    NotWorkingDay,
    OutsideBusinessHours,
    TransientFailure,
}

impl DayResult {
    pub fn has_available_slot(&self) -> bool {
        matches!(self, DayResult::Slots(slots) if slots.iter().any(|s| s.available))
    }

    pub fn slots(&self) -> &[Slot] {
        match self {
            DayResult::Slots(slots) => slots,
            _ => &[],
        }
    }

    /// Message to show when this result answers an explicitly selected day.
    /// `None` when the day has something bookable.
    pub fn notice(&self) -> Option<DayNotice> {
        match self {
            DayResult::Slots(_) if self.has_available_slot() => None,
            DayResult::Slots(_) => Some(DayNotice::NoSlots),
            DayResult::NotWorkingDay => Some(DayNotice::NotWorkingDay),
            DayResult::OutsideBusinessHours => Some(DayNotice::OutsideBusinessHours),
            DayResult::TransientFailure => Some(DayNotice::FetchFailed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayNotice {
    NotWorkingDay,
    OutsideBusinessHours,
    NoSlots,
    FetchFailed,
}

impl DayNotice {
    pub fn message(&self) -> &'static str {
        match self {
            DayNotice::NotWorkingDay => "This doctor does not attend on this weekday.",
            DayNotice::OutsideBusinessHours => "No slots within business hours for this date.",
            DayNotice::NoSlots => "No slots for this date.",
            DayNotice::FetchFailed => "Failed to query the doctor's availability.",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DayNotice::FetchFailed)
    }
}

impl fmt::Display for DayNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
