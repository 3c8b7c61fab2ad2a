use std::collections::BTreeSet;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::{
    DateSelector, DayAvailabilityFetcher, DoctorId, FixedClock, MonthAvailabilityScanner, YearMonth,
    SCAN_WORKERS,
};
use shared_utils::test_utils::{MockBackendResponses, TestConfig};

mod common;
use common::{day, full_day, open_day, FakeDirectory};

fn scanner_over(directory: Arc<FakeDirectory>, today: &str) -> MonthAvailabilityScanner {
    let fetcher = DayAvailabilityFetcher::new(directory, Duration::from_secs(5));
    MonthAvailabilityScanner::new(fetcher, Arc::new(FixedClock(day(today))))
}

fn month(s: &str) -> YearMonth {
    s.parse().unwrap()
}

#[tokio::test]
async fn never_fetches_days_before_today() {
    let directory = Arc::new(FakeDirectory::new());
    let scanner = scanner_over(Arc::clone(&directory), "2025-11-10");

    scanner.scan_month(&DoctorId::new("D1"), month("2025-11")).await;

    let calls = directory.calls();
    assert_eq!(calls.len(), 21, "10th through 30th inclusive");
    assert!(calls.iter().all(|(_, d)| *d >= day("2025-11-10")));

    let fetched: BTreeSet<_> = calls.iter().map(|(_, d)| *d).collect();
    assert_eq!(fetched.len(), calls.len(), "each day is claimed exactly once");
}

#[tokio::test]
async fn fully_past_month_issues_no_lookups() {
    let directory = Arc::new(FakeDirectory::new());
    let scanner = scanner_over(Arc::clone(&directory), "2025-11-10");

    let result = scanner.scan_month(&DoctorId::new("D1"), month("2025-10")).await;

    assert!(result.is_empty());
    assert_eq!(directory.call_count(), 0);
}

#[tokio::test]
async fn one_transient_failure_does_not_abort_the_scan() {
    let directory = Arc::new(FakeDirectory::new());
    for d in 1..=30 {
        let date = format!("2025-11-{:02}", d);
        directory.slots("D1", &date, open_day(&date));
    }
    directory.failure("D1", "2025-11-17", StatusCode::INTERNAL_SERVER_ERROR, "boom");

    let scanner = scanner_over(Arc::clone(&directory), "2025-11-01");
    let result = scanner.scan_month(&DoctorId::new("D1"), month("2025-11")).await;

    assert_eq!(directory.call_count(), 30);
    assert_eq!(result.len(), 29);
    assert!(!result.contains(&day("2025-11-17")));
}

#[tokio::test]
async fn result_only_holds_days_with_an_available_slot() {
    let directory = Arc::new(FakeDirectory::new());
    directory.slots("D1", "2025-11-03", open_day("2025-11-03"));
    directory.slots("D1", "2025-11-04", full_day("2025-11-04"));
    directory.failure(
        "D1",
        "2025-11-05",
        StatusCode::BAD_REQUEST,
        r#"{"message":"Médico não atende neste dia"}"#,
    );
    directory.failure(
        "D1",
        "2025-11-06",
        StatusCode::BAD_REQUEST,
        r#"{"message":"Fora do expediente"}"#,
    );

    let scanner = scanner_over(Arc::clone(&directory), "2025-11-01");
    let result = scanner.scan_month(&DoctorId::new("D1"), month("2025-11")).await;

    assert_eq!(result, BTreeSet::from([day("2025-11-03")]));
}

#[tokio::test]
async fn doctors_are_scanned_independently() {
    let directory = Arc::new(FakeDirectory::new());
    directory.slots("D1", "2025-11-03", open_day("2025-11-03"));
    directory.slots("D2", "2025-11-04", open_day("2025-11-04"));

    let scanner = scanner_over(Arc::clone(&directory), "2025-11-01");

    let d1 = scanner.scan_month(&DoctorId::new("D1"), month("2025-11")).await;
    let d2 = scanner.scan_month(&DoctorId::new("D2"), month("2025-11")).await;

    assert_eq!(d1, BTreeSet::from([day("2025-11-03")]));
    assert_eq!(d2, BTreeSet::from([day("2025-11-04")]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn never_more_than_four_lookups_in_flight() {
    let directory = Arc::new(FakeDirectory::with_delay(Duration::from_millis(20)));
    let scanner = scanner_over(Arc::clone(&directory), "2025-12-01");

    scanner.scan_month(&DoctorId::new("D1"), month("2025-12")).await;

    assert_eq!(directory.call_count(), 31);
    assert!(directory.peak_in_flight() <= SCAN_WORKERS);
    assert!(directory.peak_in_flight() > 1, "workers actually overlap");
}

#[tokio::test]
async fn november_scenario_over_http() {
    let server = MockServer::start().await;

    for d in 10..=30 {
        let date = format!("2025-11-{:02}", d);
        let morning = format!("{}T08:00:00", date);
        let late_morning = format!("{}T10:30:00", date);

        let response = match d {
            11 | 15 => ResponseTemplate::new(200).set_body_json(MockBackendResponses::slots_response(&[
                (morning.as_str(), false),
                (late_morning.as_str(), true),
            ])),
            16 | 23 | 30 => {
                ResponseTemplate::new(400).set_body_json(MockBackendResponses::not_working_day_response())
            }
            20 => ResponseTemplate::new(500),
            _ => ResponseTemplate::new(200)
                .set_body_json(MockBackendResponses::slots_response(&[(morning.as_str(), false)])),
        };

        Mock::given(method("GET"))
            .and(path("/medico/D1/disponibilidade"))
            .and(query_param("dia", date.as_str()))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = TestConfig::for_server(&server.uri()).to_app_config();
    let scanner = MonthAvailabilityScanner::new(
        DayAvailabilityFetcher::from_config(&config),
        Arc::new(FixedClock(day("2025-11-10"))),
    );

    let available = scanner.scan_month(&DoctorId::new("D1"), month("2025-11")).await;

    assert_eq!(available, BTreeSet::from([day("2025-11-11"), day("2025-11-15")]));
    assert_eq!(DateSelector::select_default(&available, None), Some(day("2025-11-11")));
}

/// Shared buffer the fmt layer writes into.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn worker_logs_carry_the_scan_fields() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let directory = Arc::new(FakeDirectory::new());
    directory.slots("D7", "2025-11-29", full_day("2025-11-29"));
    let scanner = scanner_over(Arc::clone(&directory), "2025-11-29");

    scanner.scan_month(&DoctorId::new("D7"), month("2025-11")).await;

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let worker_lines: Vec<&str> = output.lines().filter(|l| l.contains("contributes nothing")).collect();
    assert_eq!(worker_lines.len(), 2, "29th and 30th");
    for line in worker_lines {
        assert!(line.contains("scan_month{doctor_id=D7 month=2025-11}"), "{}", line);
    }
}
