use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn, Instrument};

use crate::clock::Clock;
use crate::models::{CalendarDay, DoctorId, YearMonth};
use crate::services::availability::DayAvailabilityFetcher;

/// Number of day lookups a month scan keeps in flight at once.
pub const SCAN_WORKERS: usize = 4;

/// Sweeps the remaining days of a month with a fixed pool of workers pulling
/// from a shared cursor. A failed day only drops out of the result.
#[derive(Clone)]
pub struct MonthAvailabilityScanner {
    fetcher: DayAvailabilityFetcher,
    clock: Arc<dyn Clock>,
    workers: usize,
}

impl MonthAvailabilityScanner {
    pub fn new(fetcher: DayAvailabilityFetcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            workers: SCAN_WORKERS,
        }
    }

    pub fn today(&self) -> CalendarDay {
        self.clock.today()
    }

    pub fn fetcher(&self) -> &DayAvailabilityFetcher {
        &self.fetcher
    }

    /// Days of `month`, today or later, that had at least one available slot.
    #[instrument(skip_all, fields(doctor_id = %doctor_id, month = %month))]
    pub async fn scan_month(&self, doctor_id: &DoctorId, month: YearMonth) -> BTreeSet<CalendarDay> {
        let today = self.today();
        let days: Vec<CalendarDay> = month
            .days()
            .into_iter()
            .filter(|day| *day >= today)
            .collect();

        if days.is_empty() {
            debug!("No remaining days to scan");
            return BTreeSet::new();
        }

        let started = Instant::now();
        let total = days.len();
        let days = Arc::new(days);
        let cursor = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(self.workers);
        for i in 0..self.workers.min(total) {
            let worker_name = format!("scan-{}-{}", month, i);
            let fetcher = self.fetcher.clone();
            let doctor_id = doctor_id.clone();
            let days = Arc::clone(&days);
            let cursor = Arc::clone(&cursor);

            handles.push(tokio::spawn(
                async move { Self::worker_loop(worker_name, fetcher, doctor_id, days, cursor).await }
                    .in_current_span(),
            ));
        }

        let mut available = BTreeSet::new();
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok(found) => available.extend(found),
                Err(e) => warn!("Scan worker aborted, its days are dropped: {}", e),
            }
        }

        info!(
            "Scanned {} days in {}ms, {} with availability",
            total,
            started.elapsed().as_millis(),
            available.len()
        );

        available
    }

    async fn worker_loop(
        worker_name: String,
        fetcher: DayAvailabilityFetcher,
        doctor_id: DoctorId,
        days: Arc<Vec<CalendarDay>>,
        cursor: Arc<AtomicUsize>,
    ) -> Vec<CalendarDay> {
        let mut found = Vec::new();

        loop {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(&day) = days.get(index) else {
                break;
            };

            let result = fetcher.fetch(&doctor_id, day).await;
            if result.has_available_slot() {
                found.push(day);
            } else {
                debug!("Worker {}: {} contributes nothing ({:?})", worker_name, day, result.notice());
            }
        }

        found
    }
}
