//! Local-time arithmetic for reminder instants.

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve a local wall-clock time to a UTC instant.
///
/// A time inside a DST gap is pushed forward by one hour; an ambiguous time
/// resolves to its earlier instant.
pub(crate) fn local_instant(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Next Monday at `hour:minute` local time, as a UTC instant.
///
/// On a Monday whose slot has not passed yet (including exactly now) the
/// slot is today; otherwise it is the following Monday.
pub(crate) fn next_weekly_time(
    tz: &Tz,
    now: DateTime<Utc>,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    let local_now = now.with_timezone(tz);
    let today = local_now.date_naive();
    let slot = NaiveTime::from_hms_opt(hour, minute, 0)?;

    let weekday = local_now.weekday().num_days_from_monday();
    if weekday == 0 {
        let scheduled = local_instant(tz, today, slot)?;
        if scheduled >= now {
            return Some(scheduled);
        }
    }

    let days_until = match (7 - weekday) % 7 {
        0 => 7,
        n => n,
    };
    let date = today.checked_add_days(Days::new(u64::from(days_until)))?;
    local_instant(tz, date, slot)
}
