use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

use crate::models::conversation::ConversationState;
use crate::models::users::{DayEntry, DayPatch, User};
use crate::repositories::assistant::TextGenerator;
use crate::streak::compute_streak;
use crate::timelock::can_record_completion;
use crate::utils::time::parse_hhmm;

mod onboarding;
mod replies;

const GREETING_WORDS: &[&str] = &["hi", "hello", "hey", "yo", "good morning", "good evening"];
const AFFIRMATIVE_WORDS: &[&str] = &["yes", "y", "yeah", "yep", "done", "did it", "coded"];
const NEGATIVE_WORDS: &[&str] = &["no", "n", "nope", "not today", "didn't", "didnt"];
const STATUS_WORDS: &[&str] = &["status", "streak", "stats"];
const WEEKLY_WORDS: &[&str] = &["week", "weekly", "summary"];
const HELP_WORDS: &[&str] = &["help", "commands"];
const RESET_WORDS: &[&str] = &["reset"];
const RESET_CONFIRM_WORDS: &[&str] = &["confirm reset", "reset confirm"];

const REFLECTION_PROMPT: &str = "You are a supportive accountability coach. In one short \
    sentence, reflect back the user's note about what they learned today, with warmth. \
    No questions.";
const ENCOURAGEMENT_PROMPT: &str = "You are a supportive accountability coach. The user \
    explains why they missed their work today. In one short sentence, acknowledge it and \
    encourage them for tomorrow. No questions.";

/// Free-text answers are clipped before storage.
const ANSWER_MAX_CHARS: usize = 500;
/// Assistant lines shorter than this read as garbage; fall back instead.
const MIN_ASSISTANT_CHARS: usize = 10;

/// What one turn produced: replies to send, the day-entry patch to merge,
/// and whether the daily log must be wiped. The mutated `User` travels
/// alongside, by way of the `&mut` the caller handed in.
pub struct RouterOutcome {
    pub replies: Vec<String>,
    pub patch: Option<DayPatch>,
    pub clear_log: bool,
}

impl RouterOutcome {
    fn with_reply(reply: String) -> Self {
        RouterOutcome {
            replies: vec![reply],
            patch: None,
            clear_log: false,
        }
    }

    fn with_replies(replies: Vec<String>) -> Self {
        RouterOutcome {
            replies,
            patch: None,
            clear_log: false,
        }
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn keyword(words: &[&str], input: &str) -> bool {
    words.iter().any(|word| *word == input)
}

fn clip(text: &str) -> String {
    text.trim().chars().take(ANSWER_MAX_CHARS).collect()
}

/// Per-user conversation state machine. Pure with respect to storage and
/// transport: the service layer loads the record, hands it in, persists
/// the result and delivers the replies. The only awaited call is the
/// optional assistant, and that is bounded by `assistant_timeout`.
pub struct Router {
    assistant: Arc<dyn TextGenerator>,
    assistant_timeout: Duration,
}

impl Router {
    pub fn new(assistant: Arc<dyn TextGenerator>, assistant_timeout: Duration) -> Self {
        Router {
            assistant,
            assistant_timeout,
        }
    }

    pub async fn handle_message(
        &self,
        user: &mut User,
        log: &[DayEntry],
        text: &str,
        today: NaiveDate,
        now: NaiveTime,
    ) -> RouterOutcome {
        if !user.onboarding_complete {
            return onboarding::advance(user, text);
        }

        let normalized = normalize(text);
        match user.conversation_state {
            Some(state) => {
                self.handle_state(state, user, log, text, &normalized, today, now)
                    .await
            }
            None => self.handle_idle(user, log, &normalized, today, now),
        }
    }

    /// Scheduler entry point: open the morning dialogue. Returns `None`
    /// when the user was already notified today, so a duplicate tick (or
    /// a tick racing a reply) sends nothing.
    pub fn morning_reminder(&self, user: &mut User, today: NaiveDate) -> Option<RouterOutcome> {
        if !user.onboarding_complete || user.last_morning_notified == Some(today) {
            return None;
        }
        user.last_morning_notified = Some(today);
        user.conversation_state = Some(ConversationState::MorningMood);
        Some(RouterOutcome::with_replies(vec![
            replies::morning_greeting(user.first_name(), today),
            replies::morning_mood_prompt(),
        ]))
    }

    /// Scheduler entry point: open the evening dialogue. Skips users who
    /// already answered today as well as already-notified ones.
    pub fn evening_reminder(&self, user: &mut User, today: NaiveDate) -> Option<RouterOutcome> {
        if !user.onboarding_complete
            || user.last_evening_notified == Some(today)
            || user.answered_on(today)
        {
            return None;
        }
        user.last_evening_notified = Some(today);
        user.conversation_state = Some(ConversationState::EveningMood);
        Some(RouterOutcome::with_reply(replies::evening_greeting(
            user.first_name(),
        )))
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_state(
        &self,
        state: ConversationState,
        user: &mut User,
        log: &[DayEntry],
        text: &str,
        normalized: &str,
        today: NaiveDate,
        now: NaiveTime,
    ) -> RouterOutcome {
        match state {
            ConversationState::MorningMood => {
                let mut patch = DayPatch::for_day(today);
                patch.mood = Some(clip(text));
                user.conversation_state = Some(ConversationState::MorningPlan);
                RouterOutcome {
                    replies: vec![replies::morning_plan_prompt()],
                    patch: Some(patch),
                    clear_log: false,
                }
            }
            ConversationState::MorningPlan => {
                let plan = clip(text);
                let mut patch = DayPatch::for_day(today);
                patch.plan = Some(plan.clone());
                user.conversation_state = None;
                RouterOutcome {
                    replies: vec![replies::morning_closed(&plan)],
                    patch: Some(patch),
                    clear_log: false,
                }
            }
            ConversationState::EveningMood => {
                let mut patch = DayPatch::for_day(today);
                patch.evening_mood = Some(clip(text));
                user.conversation_state = Some(ConversationState::EveningCheck);
                RouterOutcome {
                    replies: vec![replies::evening_check_prompt()],
                    patch: Some(patch),
                    clear_log: false,
                }
            }
            ConversationState::EveningCheck => {
                if keyword(AFFIRMATIVE_WORDS, normalized) {
                    record_completion(user, today)
                } else if keyword(NEGATIVE_WORDS, normalized) {
                    record_miss(user, today)
                } else {
                    RouterOutcome::with_reply(replies::evening_check_reprompt())
                }
            }
            ConversationState::WhatDone => {
                let mut patch = DayPatch::for_day(today);
                patch.accomplishment = Some(clip(text));
                user.conversation_state = Some(ConversationState::WhatLearned);
                RouterOutcome {
                    replies: vec![replies::what_learned_prompt()],
                    patch: Some(patch),
                    clear_log: false,
                }
            }
            ConversationState::WhatLearned => {
                let learning = clip(text);
                let closer = self
                    .assistant_line(REFLECTION_PROMPT, &learning, replies::REFLECTION_FALLBACKS, today)
                    .await;
                let mut patch = DayPatch::for_day(today);
                patch.learning = Some(learning);
                user.conversation_state = None;
                RouterOutcome {
                    replies: vec![replies::learned_ack(&closer)],
                    patch: Some(patch),
                    clear_log: false,
                }
            }
            ConversationState::WhyNot => {
                let blocker = clip(text);
                let closer = self
                    .assistant_line(
                        ENCOURAGEMENT_PROMPT,
                        &blocker,
                        replies::ENCOURAGEMENT_FALLBACKS,
                        today,
                    )
                    .await;
                let mut patch = DayPatch::for_day(today);
                patch.blocker = Some(blocker);
                user.conversation_state = None;
                RouterOutcome {
                    replies: vec![replies::why_not_ack(&closer)],
                    patch: Some(patch),
                    clear_log: false,
                }
            }
            ConversationState::ResetConfirm => {
                if keyword(RESET_CONFIRM_WORDS, normalized) {
                    perform_reset(user)
                } else {
                    // Anything that isn't the confirmation cancels, and the
                    // message is then handled as a fresh idle input.
                    user.conversation_state = None;
                    let mut outcome = self.handle_idle(user, log, normalized, today, now);
                    outcome.replies.insert(0, replies::reset_cancelled());
                    outcome
                }
            }
        }
    }

    fn handle_idle(
        &self,
        user: &mut User,
        log: &[DayEntry],
        normalized: &str,
        today: NaiveDate,
        now: NaiveTime,
    ) -> RouterOutcome {
        if keyword(GREETING_WORDS, normalized) {
            return RouterOutcome::with_reply(replies::greeting(user.first_name()));
        }
        if keyword(AFFIRMATIVE_WORDS, normalized) {
            return gated_answer(user, today, now, true);
        }
        if keyword(NEGATIVE_WORDS, normalized) {
            return gated_answer(user, today, now, false);
        }
        if keyword(STATUS_WORDS, normalized) {
            return RouterOutcome::with_reply(replies::status(user, today));
        }
        if keyword(WEEKLY_WORDS, normalized) {
            return RouterOutcome::with_reply(replies::weekly_summary(log, today));
        }
        if keyword(HELP_WORDS, normalized) {
            return RouterOutcome::with_reply(replies::help());
        }
        if keyword(RESET_WORDS, normalized) {
            user.conversation_state = Some(ConversationState::ResetConfirm);
            return RouterOutcome::with_reply(replies::reset_preview(user));
        }
        if keyword(RESET_CONFIRM_WORDS, normalized) {
            return RouterOutcome::with_reply(replies::nothing_to_confirm());
        }
        RouterOutcome::with_reply(replies::unknown_command())
    }

    async fn assistant_line(
        &self,
        prompt: &str,
        context: &str,
        fallbacks: &[&str],
        today: NaiveDate,
    ) -> String {
        let call = self.assistant.generate_short_text(prompt, context);
        match tokio::time::timeout(self.assistant_timeout, call).await {
            Ok(Ok(line)) if line.trim().chars().count() >= MIN_ASSISTANT_CHARS => {
                line.trim().to_string()
            }
            Ok(Ok(_)) => replies::pick_line(fallbacks, today),
            Ok(Err(e)) => {
                log::debug!("Assistant unavailable, using fallback: {}", e);
                replies::pick_line(fallbacks, today)
            }
            Err(_) => {
                log::debug!("Assistant call timed out, using fallback.");
                replies::pick_line(fallbacks, today)
            }
        }
    }
}

/// Idle-path day-log answer: the already-answered guard first, then the
/// time-lock. An unparseable stored evening time never locks the user out.
fn gated_answer(user: &mut User, today: NaiveDate, now: NaiveTime, coded: bool) -> RouterOutcome {
    if user.answered_on(today) {
        return RouterOutcome::with_reply(replies::already_logged());
    }
    if let Some(evening) = parse_hhmm(&user.evening_time) {
        if !can_record_completion(now, evening) {
            return RouterOutcome::with_reply(replies::too_early(&user.evening_time));
        }
    }
    if coded {
        record_completion(user, today)
    } else {
        record_miss(user, today)
    }
}

fn record_completion(user: &mut User, today: NaiveDate) -> RouterOutcome {
    if user.answered_on(today) {
        user.conversation_state = None;
        return RouterOutcome::with_reply(replies::already_logged());
    }

    let update = compute_streak(
        true,
        user.last_response_date,
        today,
        user.current_streak,
        user.longest_streak,
    );
    user.current_streak = update.streak;
    user.longest_streak = update.longest;
    user.total_completed_days += 1;
    user.last_response_date = Some(today);
    user.conversation_state = Some(ConversationState::WhatDone);

    let mut patch = DayPatch::for_day(today);
    patch.coded_today = Some(true);
    RouterOutcome {
        replies: vec![
            replies::completion_celebration(update.streak),
            replies::what_done_prompt(),
        ],
        patch: Some(patch),
        clear_log: false,
    }
}

fn record_miss(user: &mut User, today: NaiveDate) -> RouterOutcome {
    if user.answered_on(today) {
        user.conversation_state = None;
        return RouterOutcome::with_reply(replies::already_logged());
    }

    let previous_streak = user.current_streak;
    let update = compute_streak(
        false,
        user.last_response_date,
        today,
        user.current_streak,
        user.longest_streak,
    );
    user.current_streak = update.streak;
    user.longest_streak = update.longest;
    user.last_response_date = Some(today);
    user.conversation_state = Some(ConversationState::WhyNot);

    let mut patch = DayPatch::for_day(today);
    patch.coded_today = Some(false);
    RouterOutcome {
        replies: vec![replies::miss_reply(previous_streak), replies::why_not_prompt()],
        patch: Some(patch),
        clear_log: false,
    }
}

/// The destructive half of the two-phase reset. Streak fields, the log and
/// the open question go; identity, name and check-in times stay.
fn perform_reset(user: &mut User) -> RouterOutcome {
    user.current_streak = 0;
    user.longest_streak = 0;
    user.total_completed_days = 0;
    user.last_response_date = None;
    user.conversation_state = None;
    RouterOutcome {
        replies: vec![replies::reset_done()],
        patch: None,
        clear_log: true,
    }
}
