use crate::provider::RawRecord;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde_json::Value;

/// Standard monthly expirations: the third Friday of each of the next
/// `months` months (current month first), formatted `YYYY-MM-DD`.
///
/// Used as a fallback when the provider has no expiration data for a
/// symbol.
pub fn monthly_expirations(from: NaiveDate, months: usize) -> Vec<String> {
    (0..months as u32)
        .filter_map(|i| from.checked_add_months(Months::new(i)))
        .filter_map(third_friday)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}

/// Third Friday of the month containing `date`.
fn third_friday(date: NaiveDate) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let to_friday =
        (Weekday::Fri.num_days_from_monday() + 7 - first.weekday().num_days_from_monday()) % 7;
    first.checked_add_days(Days::new(u64::from(to_friday) + 14))
}

/// Distinct expiration dates present in a batch of raw records, sorted
/// ascending, capped at `max`.
pub fn expirations_from_records(records: &[RawRecord], max: usize) -> Vec<String> {
    let mut dates: Vec<String> = records
        .iter()
        .filter_map(|r| r.get("expiration").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    dates.sort();
    dates.dedup();
    dates.truncate(max);
    dates
}
