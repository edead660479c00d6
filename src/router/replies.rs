use chrono::{Datelike, NaiveDate};

use crate::models::users::{DayEntry, User};

/// Morning motivation, rotated by day-of-year so the copy varies without
/// needing a random source.
const MORNING_LINES: &[&str] = &[
    "New day, blank page. Make it count.",
    "Small steps every day. That's the whole secret.",
    "Today's effort is tomorrow's streak.",
    "Show up today. Your future self is watching.",
    "Consistency beats intensity. Let's go.",
];

/// Canned closers for the "what did you learn" step, used whenever the
/// assistant is disabled, slow, or unhelpful.
pub const REFLECTION_FALLBACKS: &[&str] = &[
    "Writing it down is how it sticks. Nice work today.",
    "Every day you learn something is a day that counts.",
    "That's the kind of note you'll be glad you kept.",
    "Good reflection. Tomorrow builds on today.",
];

/// Canned closers for the "why not" step.
pub const ENCOURAGEMENT_FALLBACKS: &[&str] = &[
    "Tomorrow is a clean slate. One day never defines you.",
    "Naming the obstacle is the first step past it.",
    "Rest matters too. Come back strong tomorrow.",
    "Streaks are built on comebacks. See you tomorrow.",
];

pub fn pick_line(lines: &[&str], day: NaiveDate) -> String {
    lines[day.ordinal() as usize % lines.len()].to_string()
}

fn plural(count: i32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

pub fn welcome() -> String {
    "\u{1F44B} Welcome to StreakCoach, your daily accountability partner.\n\n\
     Every morning I'll help you set a plan, and every evening I'll ask one \
     question: did you do the work?\n\nFirst things first, what should I call you?"
        .to_string()
}

pub fn ask_name_again() -> String {
    "I didn't catch a name there. What should I call you?".to_string()
}

pub fn ask_morning_time(name: &str) -> String {
    format!(
        "Nice to meet you, {}! What time should I check in with you each \
         morning? (24-hour HH:MM, e.g. 07:30)",
        name
    )
}

pub fn ask_evening_time(morning_time: &str) -> String {
    format!(
        "Got it, mornings at {}. And when should I ask how your day went? \
         (HH:MM, e.g. 20:30)",
        morning_time
    )
}

pub fn invalid_time() -> String {
    "That doesn't look like a valid time. Please send it as HH:MM, e.g. 07:30.".to_string()
}

pub fn onboarding_done(name: &str, morning_time: &str, evening_time: &str) -> String {
    format!(
        "Perfect, {}! \u{2705} Morning check-in at {}, evening check-in at {}.\n\n\
         Send *help* anytime to see what I can do. See you at your next check-in!",
        name, morning_time, evening_time
    )
}

pub fn morning_greeting(name: &str, day: NaiveDate) -> String {
    format!(
        "Good morning, {}! \u{2600}\u{FE0F} {}",
        name,
        pick_line(MORNING_LINES, day)
    )
}

pub fn morning_mood_prompt() -> String {
    "How are you feeling this morning?".to_string()
}

pub fn morning_plan_prompt() -> String {
    "Thanks for sharing. What's the one thing you want to get done today?".to_string()
}

pub fn morning_closed(plan: &str) -> String {
    format!(
        "Locked in: \u{201C}{}\u{201D}. I'll ask you about it tonight. \u{1F4AA}",
        plan
    )
}

pub fn evening_greeting(name: &str) -> String {
    format!("Good evening, {}! \u{1F319} How did today feel?", name)
}

pub fn evening_check_prompt() -> String {
    "Thanks. Now the big question: did you do the work today? (yes / no)".to_string()
}

pub fn evening_check_reprompt() -> String {
    "Just a quick yes or no: did you do the work today?".to_string()
}

pub fn milestone_line(streak: i32) -> Option<&'static str> {
    match streak {
        3 => Some("Three days in a row. You're building something here."),
        7 => Some("A full week! Seven days straight is how habits stick."),
        14 => Some("Two weeks straight. This is becoming who you are."),
        21 => Some("Three weeks! They say it takes 21 days to form a habit. Done."),
        30 => Some("Thirty days. A whole month of showing up."),
        50 => Some("Fifty days. Half a century of consistency."),
        100 => Some("\u{1F4AF} One hundred days. You're unstoppable."),
        365 => Some("A YEAR. Every single day for a year. Legendary."),
        _ => None,
    }
}

pub fn completion_celebration(streak: i32) -> String {
    match milestone_line(streak) {
        Some(line) => format!("\u{1F525} Day {} logged! {}", streak, line),
        None if streak > 1 => format!("\u{1F525} Logged! Your streak is now {} days.", streak),
        None => "Logged! Day 1 of your new streak. \u{1F4AA}".to_string(),
    }
}

pub fn what_done_prompt() -> String {
    "So, what did you get done today?".to_string()
}

pub fn what_learned_prompt() -> String {
    "Nice. What's one thing you learned today?".to_string()
}

pub fn learned_ack(closer: &str) -> String {
    format!("Noted. \u{1F4DD} {}", closer)
}

pub fn miss_reply(previous_streak: i32) -> String {
    if previous_streak > 0 {
        format!(
            "That {}-day streak had a good run. Tomorrow starts a new one.",
            previous_streak
        )
    } else {
        "No worries. Every day is a fresh start.".to_string()
    }
}

pub fn why_not_prompt() -> String {
    "What got in the way today?".to_string()
}

pub fn why_not_ack(closer: &str) -> String {
    format!("Thanks for being honest about it. {}", closer)
}

pub fn already_logged() -> String {
    "You've already logged today. See you tomorrow! Send *status* to check your streak."
        .to_string()
}

pub fn too_early(evening_time: &str) -> String {
    format!(
        "Hold on, your day isn't over yet! I'll take your answer after your \
         evening check-in time ({}).",
        evening_time
    )
}

pub fn greeting(name: &str) -> String {
    format!(
        "Hey, {}! \u{1F44B} I'm here whenever you're ready to log your day. \
         Send *help* to see what I can do.",
        name
    )
}

pub fn status(user: &User, today: NaiveDate) -> String {
    let today_line = if user.answered_on(today) {
        "logged \u{2713}"
    } else {
        "not logged yet"
    };
    format!(
        "\u{1F4CA} Your stats\n\
         Current streak: {} day{}\n\
         Longest streak: {} day{}\n\
         Total days completed: {}\n\
         Today: {}",
        user.current_streak,
        plural(user.current_streak),
        user.longest_streak,
        plural(user.longest_streak),
        user.total_completed_days,
        today_line
    )
}

pub fn weekly_summary(log: &[DayEntry], today: NaiveDate) -> String {
    let mut lines = Vec::with_capacity(7);
    let mut completed = 0;

    for offset in (0..7).rev() {
        let day = today - chrono::Duration::days(offset);
        let mark = log
            .iter()
            .find(|entry| entry.date == day)
            .map(|entry| match entry.coded_today {
                Some(true) => "\u{2713}",
                Some(false) => "\u{2717}",
                None => "\u{2013}",
            })
            .unwrap_or("\u{2013}");
        if mark == "\u{2713}" {
            completed += 1;
        }
        lines.push(format!("{}: {}", day.format("%a %d/%m"), mark));
    }

    format!(
        "\u{1F5D3} Your last 7 days\n{}\n{} of 7 days completed.",
        lines.join("\n"),
        completed
    )
}

pub fn help() -> String {
    "Here's what I understand:\n\
     \u{2022} *yes* / *no* to log whether you did the work today\n\
     \u{2022} *status* for your streak numbers\n\
     \u{2022} *week* for a summary of your last 7 days\n\
     \u{2022} *reset* to wipe your streak history\n\
     \u{2022} *help* to see this again\n\
     I'll also check in with you at your morning and evening times."
        .to_string()
}

pub fn reset_preview(user: &User) -> String {
    format!(
        "\u{26A0}\u{FE0F} This will erase your {}-day current streak, your \
         longest streak of {}, and {} completed day{}. Your name and check-in \
         times are kept.\n\nReply *confirm reset* to proceed. Anything else cancels.",
        user.current_streak,
        user.longest_streak,
        user.total_completed_days,
        plural(user.total_completed_days)
    )
}

pub fn reset_done() -> String {
    "Done. Everything's cleared. Day 1 starts whenever you're ready. \u{1F331}".to_string()
}

pub fn reset_cancelled() -> String {
    "Reset cancelled. Your streak is safe.".to_string()
}

pub fn nothing_to_confirm() -> String {
    "There's no reset pending. Send *reset* first if you want to start over.".to_string()
}

pub fn unknown_command() -> String {
    "I didn't catch that. Send *help* to see what I understand.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_copy_exists_for_the_week_mark() {
        let line = milestone_line(7).unwrap();
        assert!(line.contains("week"));
        assert!(milestone_line(8).is_none());
    }

    #[test]
    fn celebration_mentions_the_streak_length() {
        assert!(completion_celebration(7).contains("Day 7"));
        assert!(completion_celebration(5).contains("5 days"));
        assert!(completion_celebration(1).contains("Day 1"));
    }

    #[test]
    fn line_rotation_is_deterministic() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(
            pick_line(MORNING_LINES, day),
            pick_line(MORNING_LINES, day)
        );
    }
}
