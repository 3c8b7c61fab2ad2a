use std::collections::{BTreeSet, HashMap};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{CalendarDay, DoctorId, MonthKey, YearMonth};
use crate::services::scanner::MonthAvailabilityScanner;

/// Session-scoped memo of month scans keyed by doctor and month.
///
/// Entries are stored unfiltered and narrowed to today-or-later on every
/// read, so a cached day that has since passed drops out on its own. Two
/// callers racing on the same uncached key each run a scan; the last write wins.
pub struct AvailabilityCache {
    scanner: MonthAvailabilityScanner,
    entries: RwLock<HashMap<MonthKey, BTreeSet<CalendarDay>>>,
}

impl AvailabilityCache {
    pub fn new(scanner: MonthAvailabilityScanner) -> Self {
        Self {
            scanner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn scanner(&self) -> &MonthAvailabilityScanner {
        &self.scanner
    }

    pub async fn get_or_scan(&self, doctor_id: &DoctorId, month: YearMonth) -> BTreeSet<CalendarDay> {
        let key = MonthKey::new(doctor_id.clone(), month);

        let cached = self.entries.read().await.get(&key).cloned();
        if let Some(days) = cached {
            debug!("Availability cache hit for {}", key);
            return self.future_only(&days);
        }

        debug!("Availability cache miss for {}, scanning", key);
        let scanned = self.scanner.scan_month(doctor_id, month).await;
        let filtered = self.future_only(&scanned);

        self.entries.write().await.insert(key, scanned);
        filtered
    }

    /// Drops the entry for `key`; the next read rescans. Returns whether an
    /// entry was present.
    pub async fn invalidate(&self, key: &MonthKey) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            info!("Invalidated cached availability for {}", key);
        }
        removed
    }

    pub async fn contains(&self, key: &MonthKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn future_only(&self, days: &BTreeSet<CalendarDay>) -> BTreeSet<CalendarDay> {
        let today = self.scanner.today();
        days.range(today..).copied().collect()
    }
}
