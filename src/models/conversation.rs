/// Conversation state of a user with an open question. `None` at the
/// persistence layer means idle: top-level commands are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    MorningMood,
    MorningPlan,
    EveningMood,
    EveningCheck,
    WhatDone,
    WhatLearned,
    WhyNot,
    ResetConfirm,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::MorningMood => "morning_mood",
            ConversationState::MorningPlan => "morning_plan",
            ConversationState::EveningMood => "evening_mood",
            ConversationState::EveningCheck => "evening_check",
            ConversationState::WhatDone => "what_done",
            ConversationState::WhatLearned => "what_learned",
            ConversationState::WhyNot => "why_not",
            ConversationState::ResetConfirm => "reset_confirm",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "morning_mood" => Some(ConversationState::MorningMood),
            "morning_plan" => Some(ConversationState::MorningPlan),
            "evening_mood" => Some(ConversationState::EveningMood),
            "evening_check" => Some(ConversationState::EveningCheck),
            "what_done" => Some(ConversationState::WhatDone),
            "what_learned" => Some(ConversationState::WhatLearned),
            "why_not" => Some(ConversationState::WhyNot),
            "reset_confirm" => Some(ConversationState::ResetConfirm),
            _ => None,
        }
    }
}

/// Onboarding is a strict linear sequence; `complete` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnboardingStep {
    Welcome,
    AskName,
    AskMorningTime,
    AskEveningTime,
    Complete,
}

impl OnboardingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::Welcome => "welcome",
            OnboardingStep::AskName => "ask_name",
            OnboardingStep::AskMorningTime => "ask_morning_time",
            OnboardingStep::AskEveningTime => "ask_evening_time",
            OnboardingStep::Complete => "complete",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "welcome" => Some(OnboardingStep::Welcome),
            "ask_name" => Some(OnboardingStep::AskName),
            "ask_morning_time" => Some(OnboardingStep::AskMorningTime),
            "ask_evening_time" => Some(OnboardingStep::AskEveningTime),
            "complete" => Some(OnboardingStep::Complete),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_tags_round_trip() {
        let states = [
            ConversationState::MorningMood,
            ConversationState::MorningPlan,
            ConversationState::EveningMood,
            ConversationState::EveningCheck,
            ConversationState::WhatDone,
            ConversationState::WhatLearned,
            ConversationState::WhyNot,
            ConversationState::ResetConfirm,
        ];
        for state in states {
            assert_eq!(ConversationState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(ConversationState::parse("napping"), None);
        assert_eq!(OnboardingStep::parse("ask_shoe_size"), None);
    }

    #[test]
    fn step_tags_round_trip() {
        let steps = [
            OnboardingStep::Welcome,
            OnboardingStep::AskName,
            OnboardingStep::AskMorningTime,
            OnboardingStep::AskEveningTime,
            OnboardingStep::Complete,
        ];
        for step in steps {
            assert_eq!(OnboardingStep::parse(step.as_str()), Some(step));
        }
    }
}
