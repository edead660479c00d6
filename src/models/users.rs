use chrono::{NaiveDate, NaiveDateTime};
use sqlx::FromRow;

use super::conversation::{ConversationState, OnboardingStep};

/// The daily log keeps the most recent entries only; older rows are pruned.
pub const DAILY_LOG_CAP: i64 = 90;

#[derive(Clone, Debug)]
pub struct User {
    pub identity: String,
    pub display_name: Option<String>,
    pub onboarding_complete: bool,
    pub onboarding_step: OnboardingStep,
    pub morning_time: String,
    pub evening_time: String,
    pub last_morning_notified: Option<NaiveDate>,
    pub last_evening_notified: Option<NaiveDate>,
    pub conversation_state: Option<ConversationState>,
    pub last_response_date: Option<NaiveDate>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_completed_days: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn first_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("there")
    }

    pub fn answered_on(&self, day: NaiveDate) -> bool {
        self.last_response_date == Some(day)
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct DayEntry {
    pub id: String,
    pub user_identity: String,
    pub date: NaiveDate,
    pub coded_today: Option<bool>,
    pub mood: Option<String>,
    pub evening_mood: Option<String>,
    pub plan: Option<String>,
    pub accomplishment: Option<String>,
    pub blocker: Option<String>,
    pub learning: Option<String>,
    pub recorded_at: NaiveDateTime,
}

/// One conversation turn's mutation of a day's entry. Only the fields a
/// turn actually answered are set; the store merges them into the existing
/// row for that date, never blanking the others.
#[derive(Clone, Debug, PartialEq)]
pub struct DayPatch {
    pub date: NaiveDate,
    pub coded_today: Option<bool>,
    pub mood: Option<String>,
    pub evening_mood: Option<String>,
    pub plan: Option<String>,
    pub accomplishment: Option<String>,
    pub blocker: Option<String>,
    pub learning: Option<String>,
}

impl DayPatch {
    pub fn for_day(date: NaiveDate) -> Self {
        DayPatch {
            date,
            coded_today: None,
            mood: None,
            evening_mood: None,
            plan: None,
            accomplishment: None,
            blocker: None,
            learning: None,
        }
    }
}
