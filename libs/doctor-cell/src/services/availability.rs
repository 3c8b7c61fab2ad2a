use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use shared_config::AppConfig;

use crate::directory::{HttpSlotDirectory, SlotDirectory};
use crate::models::{CalendarDay, DayResult, DoctorId};
use crate::services::classify::classify_day_failure;

/// One bounded lookup of a doctor's slots for a single day.
///
/// Serves both the month scan, which only cares whether the day has an
/// available slot, and the selected-day view, which renders
/// [`DayResult::notice`] for the distinct failure kinds.
#[derive(Clone)]
pub struct DayAvailabilityFetcher {
    directory: Arc<dyn SlotDirectory>,
    request_timeout: Duration,
}

impl DayAvailabilityFetcher {
    pub fn new(directory: Arc<dyn SlotDirectory>, request_timeout: Duration) -> Self {
        Self {
            directory,
            request_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(HttpSlotDirectory::new(config)), config.request_timeout())
    }

    #[instrument(skip_all, fields(doctor_id = %doctor_id, day = %day))]
    pub async fn fetch(&self, doctor_id: &DoctorId, day: CalendarDay) -> DayResult {
        let lookup = self.directory.get_day_availability(doctor_id, day);

        match timeout(self.request_timeout, lookup).await {
            Ok(Ok(slots)) => {
                debug!("Received {} slots", slots.len());
                DayResult::Slots(slots)
            }
            Ok(Err(e)) => {
                let result = classify_day_failure(&e);
                debug!("Day lookup failed ({:?}): {}", result, e);
                result
            }
            Err(_) => {
                warn!("Day lookup timed out after {:?}", self.request_timeout);
                DayResult::TransientFailure
            }
        }
    }
}
