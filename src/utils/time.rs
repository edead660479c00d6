use chrono::{DateTime, Local, NaiveDate, NaiveTime};

/// Calendar day of a wall-clock instant, in the local timezone.
pub fn today(now: DateTime<Local>) -> NaiveDate {
    now.date_naive()
}

/// Signed whole-day difference between two calendar days.
pub fn day_diff(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Strict `HH:MM` 24-hour parse. A single-digit hour is accepted
/// (`7:30`), anything out of range or with trailing garbage is not.
pub fn parse_hhmm(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    let (hours, minutes) = trimmed.split_once(':')?;

    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = hours.parse().ok()?;
    let minute: u32 = minutes.parse().ok()?;

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Canonical zero-padded form used for storage and reminder matching.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn current_hhmm(now: DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_unpadded_hours() {
        assert_eq!(parse_hhmm("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_hhmm("7:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_hhmm("  23:59 "), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_hhmm("0:00"), NaiveTime::from_hms_opt(0, 0, 0));
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(parse_hhmm("25:00"), None);
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("07:60"), None);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_hhmm(""), None);
        assert_eq!(parse_hhmm("seven"), None);
        assert_eq!(parse_hhmm("0730"), None);
        assert_eq!(parse_hhmm("7:3"), None);
        assert_eq!(parse_hhmm("7:300"), None);
        assert_eq!(parse_hhmm("007:30"), None);
        assert_eq!(parse_hhmm("-7:30"), None);
        assert_eq!(parse_hhmm("7:30pm"), None);
    }

    #[test]
    fn formats_zero_padded() {
        let time = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(format_hhmm(time), "07:05");
    }

    #[test]
    fn day_diff_is_signed() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
        assert_eq!(day_diff(monday, thursday), 3);
        assert_eq!(day_diff(thursday, monday), -3);
        assert_eq!(day_diff(monday, monday), 0);
    }

    #[test]
    fn day_diff_crosses_month_boundaries() {
        let jan_31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let feb_1 = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(day_diff(jan_31, feb_1), 1);
    }
}
