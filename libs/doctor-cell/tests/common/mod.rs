#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use doctor_cell::{CalendarDay, Clock, DoctorId, Slot, SlotDirectory};
use shared_client::ClientError;

pub fn day(s: &str) -> CalendarDay {
    s.parse().expect("valid test day")
}

pub fn open_day(date: &str) -> Vec<Slot> {
    vec![
        Slot::new(format!("{}T08:00:00", date), false),
        Slot::new(format!("{}T09:00:00", date), true),
    ]
}

pub fn full_day(date: &str) -> Vec<Slot> {
    vec![
        Slot::new(format!("{}T08:00:00", date), false),
        Slot::new(format!("{}T09:00:00", date), false),
    ]
}

enum Canned {
    Slots(Vec<Slot>),
    Failure(StatusCode, String),
}

/// In-memory slot directory that records every lookup and the peak number
/// of lookups running at the same time.
pub struct FakeDirectory {
    responses: Mutex<HashMap<(String, CalendarDay), Canned>>,
    delay: Duration,
    calls: Mutex<Vec<(String, CalendarDay)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(0))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn slots(&self, doctor: &str, date: &str, slots: Vec<Slot>) {
        self.responses
            .lock()
            .unwrap()
            .insert((doctor.to_string(), day(date)), Canned::Slots(slots));
    }

    pub fn failure(&self, doctor: &str, date: &str, status: StatusCode, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert((doctor.to_string(), day(date)), Canned::Failure(status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, CalendarDay)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SlotDirectory for FakeDirectory {
    async fn get_day_availability(
        &self,
        doctor_id: &DoctorId,
        day: CalendarDay,
    ) -> Result<Vec<Slot>, ClientError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push((doctor_id.to_string(), day));

        tokio::time::sleep(self.delay).await;

        let outcome = match self.responses.lock().unwrap().get(&(doctor_id.to_string(), day)) {
            Some(Canned::Slots(slots)) => Ok(slots.clone()),
            Some(Canned::Failure(status, body)) => Err(ClientError::Http {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(Vec::new()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Clock that tests can move forward mid-session.
pub struct MovableClock(Mutex<CalendarDay>);

impl MovableClock {
    pub fn new(date: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(day(date))))
    }

    pub fn set(&self, date: &str) {
        *self.0.lock().unwrap() = day(date);
    }
}

impl Clock for MovableClock {
    fn today(&self) -> CalendarDay {
        *self.0.lock().unwrap()
    }
}
