use chrono::NaiveDate;

use crate::utils::time::day_diff;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakUpdate {
    pub streak: i32,
    pub longest: i32,
}

/// Derives the new streak counters from a day's answer. This is the only
/// place streaks are computed; callers must not adjust the counters
/// themselves outside a full reset.
///
/// The `last_response_date == today` branch exists for defense only: the
/// router rejects same-day repeats before ever calling this, and a repeat
/// must not accrue.
pub fn compute_streak(
    coded: bool,
    last_response_date: Option<NaiveDate>,
    today: NaiveDate,
    previous_streak: i32,
    previous_longest: i32,
) -> StreakUpdate {
    let streak = if !coded {
        0
    } else {
        match last_response_date {
            None => 1,
            Some(last) => match day_diff(last, today) {
                0 => previous_streak,
                1 => previous_streak + 1,
                _ => 1,
            },
        }
    };

    StreakUpdate {
        streak,
        longest: previous_longest.max(streak),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_ever_completion_starts_at_one() {
        let update = compute_streak(true, None, day(2025, 3, 10), 0, 0);
        assert_eq!(update, StreakUpdate { streak: 1, longest: 1 });
    }

    #[test]
    fn first_completion_never_lowers_longest() {
        let update = compute_streak(true, None, day(2025, 3, 10), 0, 12);
        assert_eq!(update, StreakUpdate { streak: 1, longest: 12 });
    }

    #[test]
    fn consecutive_day_increments() {
        let update = compute_streak(true, Some(day(2025, 3, 9)), day(2025, 3, 10), 6, 6);
        assert_eq!(update, StreakUpdate { streak: 7, longest: 7 });
    }

    #[test]
    fn longest_updates_only_when_exceeded() {
        let update = compute_streak(true, Some(day(2025, 3, 9)), day(2025, 3, 10), 3, 20);
        assert_eq!(update, StreakUpdate { streak: 4, longest: 20 });
    }

    #[test]
    fn gap_resets_to_one_not_zero() {
        let update = compute_streak(true, Some(day(2025, 3, 1)), day(2025, 3, 10), 15, 15);
        assert_eq!(update, StreakUpdate { streak: 1, longest: 15 });
    }

    #[test]
    fn negative_answer_zeroes_streak_and_keeps_longest() {
        let update = compute_streak(false, Some(day(2025, 3, 9)), day(2025, 3, 10), 15, 15);
        assert_eq!(update, StreakUpdate { streak: 0, longest: 15 });

        let update = compute_streak(false, None, day(2025, 3, 10), 0, 0);
        assert_eq!(update, StreakUpdate { streak: 0, longest: 0 });
    }

    #[test]
    fn same_day_reentry_leaves_streak_unchanged() {
        let update = compute_streak(true, Some(day(2025, 3, 10)), day(2025, 3, 10), 7, 9);
        assert_eq!(update, StreakUpdate { streak: 7, longest: 9 });
    }

    #[test]
    fn month_boundary_still_counts_as_consecutive() {
        let update = compute_streak(true, Some(day(2025, 2, 28)), day(2025, 3, 1), 4, 4);
        assert_eq!(update, StreakUpdate { streak: 5, longest: 5 });
    }
}
