//! Weekly vendor rotation boundary.
//!
//! The vendor inventory changes every Tuesday at 17:00 UTC. The current
//! vendor catalog is keyed by the date of the most recent cutover.

use chrono::DateTime;
use chrono::Datelike;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::Timelike;
use chrono::Utc;
use chrono::Weekday;

pub const RESET_WEEKDAY: Weekday = Weekday::Tue;
pub const RESET_HOUR_UTC: u32 = 17;

/// Returns the date of the most recent rotation cutover at or before `now`.
///
/// On the rotation day itself, before the cutover time, the previous week's
/// rotation is still active, so the boundary rolls back a full week.
pub fn previous_reset(now: DateTime<Utc>) -> NaiveDate {
    let today_index = now.weekday().num_days_from_sunday() as i64;
    let reset_index = RESET_WEEKDAY.num_days_from_sunday() as i64;
    let delta = today_index - reset_index;

    let days_back = if delta == 0 && now.hour() < RESET_HOUR_UTC {
        7
    } else if delta < 0 {
        7 + delta
    } else {
        delta
    };

    now.date_naive() - TimeDelta::days(days_back)
}

/// The instant of the most recent cutover, for callers that need the full
/// timestamp rather than the catalog key date.
pub fn previous_reset_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = previous_reset(now);
    let time = NaiveTime::from_hms_opt(RESET_HOUR_UTC, 0, 0).expect("valid reset time");
    date.and_time(time).and_utc()
}
