// libs/appointment-cell/src/services/rescheduling.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use doctor_cell::{AvailabilityCache, DayAvailabilityFetcher, DayResult, MonthKey, Slot};
use shared_client::ClientError;
use shared_config::AppConfig;

use crate::directory::{AppointmentDirectory, HttpAppointmentDirectory};
use crate::models::{Appointment, AppointmentError, AppointmentStatus};
use crate::services::lifecycle::AppointmentLifecycleService;

/// Commits appointment changes without a server-side lock.
///
/// A reschedule re-reads the target day right before the mutation and only
/// proceeds when the chosen time is still listed as available. This narrows
/// the race with other bookers but cannot close it; the remote system may
/// still reject the mutation.
pub struct ReschedulingCoordinator {
    slots: DayAvailabilityFetcher,
    appointments: Arc<dyn AppointmentDirectory>,
    lifecycle: AppointmentLifecycleService,
    cache: Option<Arc<AvailabilityCache>>,
    request_timeout: Duration,
}

impl ReschedulingCoordinator {
    pub fn new(
        slots: DayAvailabilityFetcher,
        appointments: Arc<dyn AppointmentDirectory>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            slots,
            appointments,
            lifecycle: AppointmentLifecycleService::new(),
            cache: None,
            request_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            DayAvailabilityFetcher::from_config(config),
            Arc::new(HttpAppointmentDirectory::new(config)),
            config.request_timeout(),
        )
    }

    /// Months touched by a committed change are evicted from `cache`.
    pub fn with_cache(mut self, cache: Arc<AvailabilityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Moves a scheduled appointment to `slot`, a slot picked from a
    /// previously fetched (possibly stale) list.
    #[instrument(skip_all, fields(appointment_id = %appointment.id, slot = %slot.time))]
    pub async fn reschedule(
        &self,
        appointment: &Appointment,
        slot: &Slot,
    ) -> Result<Appointment, AppointmentError> {
        self.lifecycle
            .validate_status_transition(appointment.status, AppointmentStatus::Scheduled)?;

        let day = slot.day()?;

        // Check
        match self.slots.fetch(appointment.doctor_id(), day).await {
            DayResult::Slots(fresh) => {
                let still_available = fresh.iter().any(|s| s.available && s.time == slot.time);
                if !still_available {
                    warn!("Slot {} was taken since it was displayed", slot.time);
                    return Err(AppointmentError::SlotNoLongerAvailable);
                }
            }
            other => {
                let reason = other
                    .notice()
                    .map(|notice| notice.message())
                    .unwrap_or("availability could not be confirmed");
                warn!("Could not re-validate {} before rescheduling: {:?}", day, other);
                return Err(AppointmentError::RescheduleFailed(reason.to_string()));
            }
        }

        debug!("Slot {} still available, committing", slot.time);

        // Act
        self.bounded(self.appointments.reschedule_appointment(&appointment.id, &slot.time))
            .await
            .map_err(|reason| {
                error!("Reschedule of {} rejected: {}", appointment.id, reason);
                AppointmentError::RescheduleFailed(reason)
            })?;

        let updated = Appointment {
            scheduled_time: slot.time.clone(),
            ..appointment.clone()
        };

        info!("Appointment {} moved from {} to {}", appointment.id, appointment.scheduled_time, slot.time);

        self.evict(appointment.month_key().ok()).await;
        self.evict(updated.month_key().ok()).await;

        Ok(updated)
    }

    pub async fn cancel(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.change_status(appointment, AppointmentStatus::Cancelled).await
    }

    pub async fn mark_no_show(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.change_status(appointment, AppointmentStatus::NoShow).await
    }

    #[instrument(skip_all, fields(appointment_id = %appointment.id, status = %status))]
    async fn change_status(
        &self,
        appointment: &Appointment,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        self.lifecycle.validate_status_transition(appointment.status, status)?;

        self.bounded(self.appointments.set_appointment_status(&appointment.id, status))
            .await
            .map_err(|reason| {
                error!("Status change of {} rejected: {}", appointment.id, reason);
                AppointmentError::StatusChangeFailed(reason)
            })?;

        info!("Appointment {} is now {}", appointment.id, status);

        self.evict(appointment.month_key().ok()).await;

        Ok(Appointment {
            status,
            ..appointment.clone()
        })
    }

    async fn bounded<F>(&self, call: F) -> Result<(), String>
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        match timeout(self.request_timeout, call).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("request timed out after {:?}", self.request_timeout)),
        }
    }

    async fn evict(&self, key: Option<MonthKey>) {
        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.invalidate(&key).await;
        }
    }
}
