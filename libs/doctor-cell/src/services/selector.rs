use std::collections::BTreeSet;

use crate::models::CalendarDay;

/// Picks which day the calendar should show as selected after a month's
/// availability is known.
pub struct DateSelector;

impl DateSelector {
    /// Keeps `current` when it is still available, otherwise moves to the
    /// earliest available day. `None` means the selection (and any slots
    /// loaded for it) must be cleared.
    pub fn select_default(
        available: &BTreeSet<CalendarDay>,
        current: Option<CalendarDay>,
    ) -> Option<CalendarDay> {
        match current {
            Some(day) if available.contains(&day) => Some(day),
            _ => available.first().copied(),
        }
    }
}
