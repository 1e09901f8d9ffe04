use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Weekday};

pub const MINUTE_MS: i64 = 60_000;
pub const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

pub fn date_range(anchor: NaiveDate, days_before: u32, days_after: u32) -> Vec<NaiveDate> {
    let Some(first) = anchor.checked_sub_days(Days::new(days_before as u64)) else {
        return vec![anchor];
    };

    first
        .iter_days()
        .take(days_before as usize + days_after as usize + 1)
        .collect()
}

/// Midnight of `date` in `tz`. Falls back to the first valid instant when the
/// zone skips midnight.
pub fn midnight_ms<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let local = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&local).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => {
            let shifted = local + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.timestamp_millis())
                .unwrap_or_else(|| local.and_utc().timestamp_millis())
        }
    }
}

pub fn date_of<Tz: TimeZone>(tz: &Tz, ts_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ts_ms).map(|dt| dt.with_timezone(tz).date_naive())
}

pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

pub fn minutes_into_day(day_start_ms: i64, ts_ms: i64) -> f64 {
    (ts_ms - day_start_ms) as f64 / MINUTE_MS as f64
}

pub fn percent_of_range(value: f64, range_start: f64, range_end: f64) -> f64 {
    let span = range_end - range_start;
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    (value - range_start) / span * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandKey {
    Month { year: i32, month: u32 },
    Week { year: i32, week: u32 },
}

pub fn month_key(date: NaiveDate) -> BandKey {
    BandKey::Month {
        year: date.year(),
        month: date.month(),
    }
}

pub fn iso_week_key(date: NaiveDate) -> BandKey {
    let iso = date.iso_week();
    BandKey::Week {
        year: iso.year(),
        week: iso.week(),
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
