pub mod availability;
pub mod cache;
pub mod classify;
pub mod scanner;
pub mod selector;

pub use availability::DayAvailabilityFetcher;
pub use cache::AvailabilityCache;
pub use classify::classify_day_failure;
pub use scanner::{MonthAvailabilityScanner, SCAN_WORKERS};
pub use selector::DateSelector;
