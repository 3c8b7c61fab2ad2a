use reqwest::StatusCode;

use shared_client::ClientError;
use shared_models::ApiErrorBody;

use crate::models::DayResult;

// The backend only reports these through free text on a 400; there is no
// error code to match on yet.
const NOT_WORKING_DAY_PATTERN: &str = "não atende neste dia";
const OUTSIDE_BUSINESS_HOURS_PATTERN: &str = "fora do expediente";

/// Maps a failed day lookup onto the day-outcome taxonomy.
pub fn classify_day_failure(error: &ClientError) -> DayResult {
    if error.status() != Some(StatusCode::BAD_REQUEST) {
        return DayResult::TransientFailure;
    }

    let message = error
        .body()
        .and_then(ApiErrorBody::parse)
        .and_then(|body| body.text().map(str::to_lowercase));

    match message {
        Some(msg) if msg.contains(NOT_WORKING_DAY_PATTERN) => DayResult::NotWorkingDay,
        Some(msg) if msg.contains(OUTSIDE_BUSINESS_HOURS_PATTERN) => DayResult::OutsideBusinessHours,
        _ => DayResult::TransientFailure,
    }
}
