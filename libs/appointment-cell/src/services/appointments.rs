use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::directory::{AppointmentDirectory, HttpAppointmentDirectory};
use crate::models::{scheduled_only, Appointment, AppointmentError};

pub struct AppointmentService {
    directory: Arc<dyn AppointmentDirectory>,
    request_timeout: Duration,
}

impl AppointmentService {
    pub fn new(directory: Arc<dyn AppointmentDirectory>, request_timeout: Duration) -> Self {
        Self {
            directory,
            request_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(HttpAppointmentDirectory::new(config)), config.request_timeout())
    }

    /// Appointments still in `AGENDADO`, as the backend orders them.
    pub async fn list_scheduled(&self) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = match timeout(self.request_timeout, self.directory.list_appointments()).await {
            Ok(Ok(appointments)) => appointments,
            Ok(Err(e)) => {
                error!("Failed to load appointments: {}", e);
                return Err(AppointmentError::ListFailed(e.to_string()));
            }
            Err(_) => {
                error!("Loading appointments timed out");
                return Err(AppointmentError::ListFailed("request timed out".to_string()));
            }
        };

        let scheduled = scheduled_only(appointments);
        debug!("Loaded {} scheduled appointments", scheduled.len());
        Ok(scheduled)
    }

    pub async fn find_scheduled(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        self.list_scheduled()
            .await?
            .into_iter()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))
    }
}
