use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{
    AppointmentDirectory, AppointmentError, AppointmentService, AppointmentStatus,
    HttpAppointmentDirectory,
};
use shared_utils::test_utils::MockBackendResponses;

mod common;
use common::config_for;

async fn mount_listing(server: &MockServer) {
    let listing = MockBackendResponses::appointments_response(vec![
        MockBackendResponses::appointment_response("A1", "D1", "2025-11-20T09:00:00", "AGENDADO"),
        MockBackendResponses::appointment_response("A2", "D1", "2025-11-03T14:00:00", "CONCLUIDO"),
        MockBackendResponses::appointment_response("A3", "D2", "2025-11-21T10:00:00", "AGENDADO"),
        MockBackendResponses::appointment_response("A4", "D2", "2025-11-05T11:00:00", "CANCELADO"),
    ]);

    Mock::given(method("GET"))
        .and(path("/agendamento"))
        .and(header("authorization", "Bearer test-api-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(server)
        .await;
}

#[tokio::test]
async fn lists_appointments_with_nested_doctor() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let directory = HttpAppointmentDirectory::new(&config_for(&server));
    let appointments = directory.list_appointments().await.unwrap();

    assert_eq!(appointments.len(), 4);
    assert_eq!(appointments[0].id, "A1");
    assert_eq!(appointments[0].doctor_id().as_str(), "D1");
    assert_eq!(appointments[1].status, AppointmentStatus::Completed);
    assert!(appointments[0].dependent.is_none());
}

#[tokio::test]
async fn reschedule_patches_the_new_time() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/agendamento/A1/data"))
        .and(body_json(json!({ "horario": "2025-11-11T10:30:00" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockBackendResponses::empty_success()))
        .expect(1)
        .mount(&server)
        .await;

    let directory = HttpAppointmentDirectory::new(&config_for(&server));
    directory
        .reschedule_appointment("A1", "2025-11-11T10:30:00")
        .await
        .unwrap();
}

#[tokio::test]
async fn status_change_sends_wire_name() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/agendamento/A1/status"))
        .and(body_json(json!({ "status": "FALTOU" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let directory = HttpAppointmentDirectory::new(&config_for(&server));
    directory
        .set_appointment_status("A1", AppointmentStatus::NoShow)
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_patch_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/agendamento/A1/data"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(MockBackendResponses::error_response("Horário ocupado")),
        )
        .mount(&server)
        .await;

    let directory = HttpAppointmentDirectory::new(&config_for(&server));
    let err = directory
        .reschedule_appointment("A1", "2025-11-11T10:30:00")
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(409));
}

#[tokio::test]
async fn service_lists_only_scheduled() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let service = AppointmentService::from_config(&config_for(&server));
    let scheduled = service.list_scheduled().await.unwrap();

    let ids: Vec<&str> = scheduled.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["A1", "A3"]);
}

#[tokio::test]
async fn service_finds_scheduled_by_id() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let service = AppointmentService::from_config(&config_for(&server));

    assert_eq!(service.find_scheduled("A3").await.unwrap().doctor_id().as_str(), "D2");
    // A2 exists but is already concluded.
    assert_matches!(service.find_scheduled("A2").await, Err(AppointmentError::NotFound(id)) if id == "A2");
}

#[tokio::test]
async fn service_reports_listing_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agendamento"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = AppointmentService::from_config(&config_for(&server));

    assert_matches!(service.list_scheduled().await, Err(AppointmentError::ListFailed(_)));
}
