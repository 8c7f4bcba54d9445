//! Calendar features derived from an observation timestamp.
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Hour of day, `0..=23`.
pub fn hour_of_day(ts: &NaiveDateTime) -> u32 {
    ts.hour()
}

/// Day of week with Monday = 0 through Sunday = 6.
pub fn day_of_week(ts: &NaiveDateTime) -> u32 {
    ts.weekday().num_days_from_monday()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    // Purpose
    // -------
    // Pin the week convention: 2024-04-07 is a Sunday (6) and 2024-04-08 a
    // Monday (0).
    fn day_of_week_starts_on_monday() {
        let sunday = NaiveDate::from_ymd_opt(2024, 4, 7).unwrap().and_hms_opt(23, 0, 0).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 4, 8).unwrap().and_hms_opt(0, 30, 0).unwrap();

        assert_eq!(day_of_week(&sunday), 6);
        assert_eq!(day_of_week(&monday), 0);
        assert_eq!(hour_of_day(&sunday), 23);
        assert_eq!(hour_of_day(&monday), 0);
    }
}
