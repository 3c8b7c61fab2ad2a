#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::{Appointment, ReschedulingCoordinator};
use doctor_cell::{
    AvailabilityCache, CalendarDay, DayAvailabilityFetcher, FixedClock, MonthAvailabilityScanner,
};
use shared_config::AppConfig;
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

pub fn day(s: &str) -> CalendarDay {
    s.parse().expect("valid test day")
}

pub fn appointment(id: &str, doctor: &str, time: &str, status: &str) -> Appointment {
    serde_json::from_value(MockBackendResponses::appointment_response(id, doctor, time, status))
        .expect("valid appointment fixture")
}

pub fn config_for(server: &MockServer) -> AppConfig {
    TestConfig::for_server(&server.uri()).to_app_config()
}

/// Cache and coordinator wired against `server`, with "today" pinned.
pub fn wire(server: &MockServer, today: &str) -> (Arc<AvailabilityCache>, Arc<ReschedulingCoordinator>) {
    let config = config_for(server);
    let scanner = MonthAvailabilityScanner::new(
        DayAvailabilityFetcher::from_config(&config),
        Arc::new(FixedClock(day(today))),
    );
    let cache = Arc::new(AvailabilityCache::new(scanner));
    let coordinator = Arc::new(ReschedulingCoordinator::from_config(&config).with_cache(Arc::clone(&cache)));
    (cache, coordinator)
}

pub async fn mount_day(server: &MockServer, doctor: &str, date: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/medico/{}/disponibilidade", doctor)))
        .and(query_param("dia", date))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// November 2025 from the 10th: the 11th and 15th have an open 10:30 slot,
/// every other day is fully booked.
pub async fn mount_november(server: &MockServer, doctor: &str) {
    for d in 10..=30 {
        let date = format!("2025-11-{:02}", d);
        let morning = format!("{}T08:00:00", date);
        let late_morning = format!("{}T10:30:00", date);
        let open = d == 11 || d == 15;

        mount_day(
            server,
            doctor,
            &date,
            MockBackendResponses::slots_response(&[(morning.as_str(), false), (late_morning.as_str(), open)]),
        )
        .await;
    }
}
