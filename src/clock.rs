use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};

const MORNING_RUSH: std::ops::Range<u32> = 7..9;
const EVENING_RUSH: std::ops::Range<u32> = 16..19;

/// `None` once the offset leaves the range chrono can represent.
pub fn simulation_time(
    start: NaiveDateTime,
    step: u64,
    time_step_seconds: u32,
) -> Option<NaiveDateTime> {
    let seconds = i64::try_from(step).ok()?.checked_mul(time_step_seconds as i64)?;
    start.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Weekday morning and evening peaks, by local wall-clock hour.
pub fn is_rush_hour(time: NaiveDateTime) -> bool {
    let is_weekday = time.weekday().num_days_from_monday() < 5;
    let hour = time.hour();
    is_weekday && (MORNING_RUSH.contains(&hour) || EVENING_RUSH.contains(&hour))
}

pub fn iso_timestamp(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    use super::{is_rush_hour, iso_timestamp, simulation_time};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_simulation_time_advances_by_step() {
        let start = at(2023, 1, 1, 0, 0);
        assert_eq!(simulation_time(start, 0, 30), Some(start));
        assert_eq!(
            simulation_time(start, 3, 30),
            Some(at(2023, 1, 1, 0, 1) + TimeDelta::seconds(30))
        );
        assert_eq!(simulation_time(start, 120, 30), Some(at(2023, 1, 1, 1, 0)));
    }

    #[test]
    fn test_simulation_time_out_of_range() {
        let start = at(2023, 1, 1, 0, 0);
        assert!(simulation_time(start, 1000, u32::MAX).is_some());
        assert_eq!(simulation_time(start, 3000, u32::MAX), None);
        assert_eq!(simulation_time(start, u64::MAX, 30), None);
        assert_eq!(simulation_time(NaiveDateTime::MAX, 1, 1), None);
    }

    #[test]
    fn test_rush_hour_windows() {
        // 2023-01-02 is a Monday
        assert!(is_rush_hour(at(2023, 1, 2, 7, 0)));
        assert!(is_rush_hour(at(2023, 1, 2, 8, 59)));
        assert!(!is_rush_hour(at(2023, 1, 2, 9, 0)));
        assert!(is_rush_hour(at(2023, 1, 2, 16, 0)));
        assert!(is_rush_hour(at(2023, 1, 2, 18, 30)));
        assert!(!is_rush_hour(at(2023, 1, 2, 19, 0)));
        assert!(!is_rush_hour(at(2023, 1, 2, 12, 0)));
        // weekend
        assert!(!is_rush_hour(at(2023, 1, 1, 8, 0)));
        assert!(!is_rush_hour(at(2023, 1, 7, 17, 0)));
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(iso_timestamp(at(2023, 1, 1, 0, 0)), "2023-01-01T00:00:00");
        assert_eq!(iso_timestamp(at(2024, 12, 31, 23, 59)), "2024-12-31T23:59:00");
    }
}
