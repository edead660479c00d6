use crate::models::conversation::OnboardingStep;
use crate::models::users::User;
use crate::utils::time::{format_hhmm, parse_hhmm};

use super::{replies, RouterOutcome};

const NAME_MAX_CHARS: usize = 60;

/// While onboarding is incomplete every inbound message, whatever it says,
/// is the answer to the current step. A time answer that fails to parse
/// re-prompts without advancing.
pub fn advance(user: &mut User, text: &str) -> RouterOutcome {
    match user.onboarding_step {
        OnboardingStep::Welcome => {
            user.onboarding_step = OnboardingStep::AskName;
            RouterOutcome::with_reply(replies::welcome())
        }
        OnboardingStep::AskName => {
            let name = text.trim();
            if name.is_empty() {
                return RouterOutcome::with_reply(replies::ask_name_again());
            }
            let name: String = name.chars().take(NAME_MAX_CHARS).collect();
            user.display_name = Some(name.clone());
            user.onboarding_step = OnboardingStep::AskMorningTime;
            RouterOutcome::with_reply(replies::ask_morning_time(&name))
        }
        OnboardingStep::AskMorningTime => match parse_hhmm(text) {
            Some(time) => {
                user.morning_time = format_hhmm(time);
                user.onboarding_step = OnboardingStep::AskEveningTime;
                RouterOutcome::with_reply(replies::ask_evening_time(&user.morning_time))
            }
            None => RouterOutcome::with_reply(replies::invalid_time()),
        },
        OnboardingStep::AskEveningTime => match parse_hhmm(text) {
            Some(time) => {
                user.evening_time = format_hhmm(time);
                user.onboarding_step = OnboardingStep::Complete;
                user.onboarding_complete = true;
                RouterOutcome::with_reply(replies::onboarding_done(
                    user.first_name(),
                    &user.morning_time,
                    &user.evening_time,
                ))
            }
            None => RouterOutcome::with_reply(replies::invalid_time()),
        },
        // A record that reached `complete` without the flag is repaired
        // rather than trapped in onboarding forever.
        OnboardingStep::Complete => {
            user.onboarding_complete = true;
            RouterOutcome::with_reply(replies::help())
        }
    }
}
