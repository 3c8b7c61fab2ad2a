use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use doctor_cell::{AvailabilityCache, CalendarDay, DateSelector, DayNotice, DayResult, Slot, YearMonth};

use crate::models::{Appointment, AppointmentError};
use crate::services::rescheduling::ReschedulingCoordinator;

/// State of one reschedule flow: month browsing, day selection, slot choice
/// and the final commit. Built once per appointment being moved.
pub struct ReschedulingSession {
    cache: Arc<AvailabilityCache>,
    coordinator: Arc<ReschedulingCoordinator>,
    appointment: Appointment,
    month: YearMonth,
    available_days: BTreeSet<CalendarDay>,
    selected_day: Option<CalendarDay>,
    day_result: Option<DayResult>,
    chosen_slot: Option<Slot>,
}

impl ReschedulingSession {
    /// Starts at the month of the appointment's current time, with that day
    /// preselected when it still has availability.
    pub async fn open(
        cache: Arc<AvailabilityCache>,
        coordinator: Arc<ReschedulingCoordinator>,
        appointment: Appointment,
    ) -> Result<Self, AppointmentError> {
        let current_day = appointment.scheduled_day()?;

        let mut session = Self {
            cache,
            coordinator,
            appointment,
            month: current_day.year_month(),
            available_days: BTreeSet::new(),
            selected_day: Some(current_day),
            day_result: None,
            chosen_slot: None,
        };

        session.refresh_month().await;
        Ok(session)
    }

    pub async fn change_month(&mut self, month: YearMonth) -> Option<DayNotice> {
        self.month = month;
        self.refresh_month().await
    }

    /// Loads the slot list for `day`, dropping any chosen slot. A day in
    /// another month moves the session to that month first. The notice is
    /// what the user should see for this day, if anything.
    pub async fn select_day(&mut self, day: CalendarDay) -> Option<DayNotice> {
        if day.year_month() != self.month {
            debug!("{} lies outside {}, switching month", day, self.month);
            self.month = day.year_month();
            self.available_days = self
                .cache
                .get_or_scan(self.appointment.doctor_id(), self.month)
                .await;
        }

        self.selected_day = Some(day);
        self.chosen_slot = None;

        let result = self
            .cache
            .scanner()
            .fetcher()
            .fetch(self.appointment.doctor_id(), day)
            .await;

        let notice = result.notice();
        self.day_result = Some(result);
        notice
    }

    /// Picks a slot from the loaded list. Only available entries qualify.
    pub fn choose_slot(&mut self, time: &str) -> Result<&Slot, AppointmentError> {
        let slot = self
            .slots()
            .iter()
            .find(|s| s.available && s.time == time)
            .cloned()
            .ok_or_else(|| AppointmentError::SlotNotSelectable(time.to_string()))?;

        Ok(self.chosen_slot.insert(slot))
    }

    pub async fn confirm(&mut self) -> Result<&Appointment, AppointmentError> {
        let slot = self.chosen_slot.clone().ok_or(AppointmentError::NoSlotSelected)?;

        let updated = self.coordinator.reschedule(&self.appointment, &slot).await?;
        info!("Session committed appointment {} to {}", updated.id, updated.scheduled_time);

        self.appointment = updated;
        self.chosen_slot = None;
        Ok(&self.appointment)
    }

    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn available_days(&self) -> &BTreeSet<CalendarDay> {
        &self.available_days
    }

    pub fn selected_day(&self) -> Option<CalendarDay> {
        self.selected_day
    }

    pub fn slots(&self) -> &[Slot] {
        self.day_result.as_ref().map(DayResult::slots).unwrap_or(&[])
    }

    pub fn chosen_slot(&self) -> Option<&Slot> {
        self.chosen_slot.as_ref()
    }

    async fn refresh_month(&mut self) -> Option<DayNotice> {
        self.available_days = self
            .cache
            .get_or_scan(self.appointment.doctor_id(), self.month)
            .await;

        match DateSelector::select_default(&self.available_days, self.selected_day) {
            None => {
                debug!("No availability in {}, clearing selection", self.month);
                self.selected_day = None;
                self.day_result = None;
                self.chosen_slot = None;
                None
            }
            Some(day) if Some(day) == self.selected_day && self.day_result.is_some() => None,
            Some(day) => self.select_day(day).await,
        }
    }
}
