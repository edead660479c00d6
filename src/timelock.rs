use chrono::{NaiveTime, Timelike};

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// May a "day complete" answer be accepted right now? True from the
/// user's configured evening time onward; hour/minute comparison only,
/// no date component.
pub fn can_record_completion(now: NaiveTime, evening_time: NaiveTime) -> bool {
    minute_of_day(now) >= minute_of_day(evening_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn rejects_before_the_cutoff() {
        assert!(!can_record_completion(time(19, 59), time(20, 0)));
        assert!(!can_record_completion(time(0, 0), time(20, 0)));
    }

    #[test]
    fn accepts_at_the_exact_minute() {
        assert!(can_record_completion(time(20, 0), time(20, 0)));
    }

    #[test]
    fn accepts_after_the_cutoff() {
        assert!(can_record_completion(time(20, 1), time(20, 0)));
        assert!(can_record_completion(time(23, 59), time(20, 0)));
    }

    #[test]
    fn seconds_do_not_matter() {
        let now = NaiveTime::from_hms_opt(19, 59, 59).unwrap();
        assert!(!can_record_completion(now, time(20, 0)));
    }

    #[test]
    fn midnight_cutoff_always_passes() {
        assert!(can_record_completion(time(0, 0), time(0, 0)));
        assert!(can_record_completion(time(12, 30), time(0, 0)));
    }
}
