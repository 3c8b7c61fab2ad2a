use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use shared_client::{BackendClient, ClientError};
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentStatus};

/// Remote appointment operations. Each call is a single request; the remote
/// side decides whether it succeeds.
#[async_trait]
pub trait AppointmentDirectory: Send + Sync {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError>;

    async fn reschedule_appointment(
        &self,
        appointment_id: &str,
        new_time: &str,
    ) -> Result<(), ClientError>;

    async fn set_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ClientError>;
}

pub struct HttpAppointmentDirectory {
    client: BackendClient,
}

impl HttpAppointmentDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: BackendClient::new(config),
        }
    }
}

#[async_trait]
impl AppointmentDirectory for HttpAppointmentDirectory {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        debug!("Fetching appointments");

        let appointments: Option<Vec<Appointment>> = self.client.request(
            Method::GET,
            "/agendamento",
            &[],
            None,
        ).await?;

        Ok(appointments.unwrap_or_default())
    }

    async fn reschedule_appointment(
        &self,
        appointment_id: &str,
        new_time: &str,
    ) -> Result<(), ClientError> {
        debug!("Moving appointment {} to {}", appointment_id, new_time);

        let path = format!("/agendamento/{}/data", appointment_id);
        self.client.execute(
            Method::PATCH,
            &path,
            Some(json!({ "horario": new_time })),
        ).await
    }

    async fn set_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ClientError> {
        debug!("Setting appointment {} status to {}", appointment_id, status);

        let path = format!("/agendamento/{}/status", appointment_id);
        self.client.execute(
            Method::PATCH,
            &path,
            Some(json!({ "status": status })),
        ).await
    }
}
