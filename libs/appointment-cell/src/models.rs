// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use doctor_cell::{slot_day, CalendarDay, DoctorId, ModelError, MonthKey};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    #[serde(rename = "idAgendamento")]
    pub id: String,
    #[serde(rename = "medico")]
    pub doctor: DoctorRef,
    #[serde(rename = "colaborador", default)]
    pub collaborator: Option<PersonRef>,
    #[serde(rename = "dependente", default)]
    pub dependent: Option<PersonRef>,
    /// Scheduled slot time, exactly as the backend reports it.
    #[serde(rename = "horario")]
    pub scheduled_time: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn doctor_id(&self) -> &DoctorId {
        &self.doctor.id
    }

    pub fn scheduled_day(&self) -> Result<CalendarDay, ModelError> {
        slot_day(&self.scheduled_time)
    }

    /// Availability cache entry covering the current scheduled time.
    pub fn month_key(&self) -> Result<MonthKey, ModelError> {
        let day = self.scheduled_day()?;
        Ok(MonthKey::new(self.doctor.id.clone(), day.year_month()))
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorRef {
    pub id: DoctorId,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonRef {
    pub id: String,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "AGENDADO")]
    Scheduled,
    #[serde(rename = "CONCLUIDO", alias = "REALIZADO")]
    Completed,
    #[serde(rename = "CANCELADO")]
    Cancelled,
    #[serde(rename = "FALTOU")]
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "AGENDADO",
            AppointmentStatus::Completed => "CONCLUIDO",
            AppointmentStatus::Cancelled => "CANCELADO",
            AppointmentStatus::NoShow => "FALTOU",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only scheduled appointments, in the order given.
pub fn scheduled_only(appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.into_iter().filter(Appointment::is_scheduled).collect()
}

/// Appointments whose scheduled time falls on `day`. Entries with an
/// unreadable time are left out.
pub fn on_day(appointments: &[Appointment], day: CalendarDay) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| a.scheduled_day().map(|d| d == day).unwrap_or(false))
        .cloned()
        .collect()
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("This slot is no longer available for the doctor")]
    SlotNoLongerAvailable,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Slot is not available in the loaded list: {0}")]
    SlotNotSelectable(String),

    #[error("No slot selected")]
    NoSlotSelected,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(#[from] ModelError),

    #[error("Could not reschedule the appointment: {0}")]
    RescheduleFailed(String),

    #[error("Could not change the appointment status: {0}")]
    StatusChangeFailed(String),

    #[error("Could not load appointments: {0}")]
    ListFailed(String),
}

impl AppointmentError {
    /// The slot was taken between display and commit; expected, not a fault.
    pub fn is_stale_slot(&self) -> bool {
        matches!(self, AppointmentError::SlotNoLongerAvailable)
    }
}
