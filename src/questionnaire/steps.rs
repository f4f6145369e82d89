//! Wizard steps and the per-step completeness rules.

use serde::{Deserialize, Serialize};

use crate::format::is_valid_email;

use super::answers::AnswerSet;
use super::options::{Question, QuestionOption};

/// The eleven questionnaire steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    BusinessJourney,
    InterestReasons,
    AvailableCapital,
    MainGoal,
    TimeCommitment,
    ReadyToMoveForward,
    SupportNeeded,
    StrategyCallCommitment,
    FullName,
    Email,
    Phone,
}

impl Step {
    pub const FIRST: Step = Step::BusinessJourney;
    pub const LAST: Step = Step::Phone;

    pub const ALL: [Step; 11] = [
        Step::BusinessJourney,
        Step::InterestReasons,
        Step::AvailableCapital,
        Step::MainGoal,
        Step::TimeCommitment,
        Step::ReadyToMoveForward,
        Step::SupportNeeded,
        Step::StrategyCallCommitment,
        Step::FullName,
        Step::Email,
        Step::Phone,
    ];

    /// 1-based position.
    pub fn index(&self) -> u8 {
        *self as u8 + 1
    }

    /// Step at a 1-based position; `None` outside 1..=11.
    pub fn from_index(index: u8) -> Option<Step> {
        let i = usize::from(index).checked_sub(1)?;
        Self::ALL.get(i).copied()
    }

    pub fn next(&self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(&self) -> Option<Step> {
        Self::from_index(self.index() - 1)
    }

    /// The select question asked at this step, if any.
    pub fn question(&self) -> Option<Question> {
        match self {
            Self::BusinessJourney => Some(Question::BusinessJourney),
            Self::InterestReasons => Some(Question::InterestReasons),
            Self::AvailableCapital => Some(Question::AvailableCapital),
            Self::MainGoal => Some(Question::MainGoal),
            Self::TimeCommitment => Some(Question::TimeCommitment),
            Self::ReadyToMoveForward => Some(Question::ReadyToMoveForward),
            Self::SupportNeeded => Some(Question::SupportNeeded),
            Self::StrategyCallCommitment => Some(Question::StrategyCallCommitment),
            Self::FullName | Self::Email | Self::Phone => None,
        }
    }

    /// Prompt shown for this step.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::BusinessJourney => "Where are you currently in your business journey?",
            Self::InterestReasons => {
                "Why are you interested in this solar business opportunity? (Select all that apply)"
            }
            Self::AvailableCapital => {
                "How much capital do you currently have access to for launching a business like this?"
            }
            Self::MainGoal => "What's your main goal with this opportunity?",
            Self::TimeCommitment => {
                "Do you have 2–3 hours per week to oversee your solar business if we handle the rest?"
            }
            Self::ReadyToMoveForward => {
                "How soon would you be ready to move forward if everything checks out?"
            }
            Self::SupportNeeded => {
                "Where would you value additional clarity or support before moving forward? (Select all that apply)"
            }
            Self::StrategyCallCommitment => {
                "If we offer you a private strategy call, are you 100% committed to showing up on time?"
            }
            Self::FullName => "What is your full name?",
            Self::Email => "What is your email address?",
            Self::Phone => "What is your phone number?",
        }
    }

    /// Whether the step's required fields are satisfied.
    pub fn is_complete(&self, answers: &AnswerSet) -> bool {
        match self {
            Self::BusinessJourney => answers.business_journey.is_some(),
            Self::InterestReasons => !answers.interest_reasons.is_empty(),
            Self::AvailableCapital => answers.available_capital.is_some(),
            Self::MainGoal => answers.main_goal.is_some(),
            Self::TimeCommitment => answers.time_commitment.is_some(),
            Self::ReadyToMoveForward => answers.ready_to_move_forward.is_some(),
            Self::SupportNeeded => {
                if answers.support_needed.is_empty() {
                    return false;
                }
                let needs_elaboration = answers.support_needed.iter().any(|o| o.is_other());
                !needs_elaboration || !answers.other_support_needed.trim().is_empty()
            }
            Self::StrategyCallCommitment => answers.strategy_call_commitment.is_some(),
            Self::FullName => {
                !answers.first_name.trim().is_empty() && !answers.last_name.trim().is_empty()
            }
            Self::Email => {
                let email = answers.email.trim();
                !email.is_empty() && is_valid_email(email)
            }
            Self::Phone => !answers.phone.trim().is_empty(),
        }
    }

    /// Summary of the answer given at this step, for continue-click notifications.
    pub fn answer_summary(&self, answers: &AnswerSet) -> String {
        match self {
            Self::FullName => answers.full_name(),
            Self::Email => answers.email.clone(),
            Self::Phone => answers.phone.clone(),
            step => match step.question() {
                Some(q) if q.is_multi_select() => answers.multi_labels(q).join(", "),
                Some(q) => answers
                    .single(q)
                    .map(|a| a.label().to_string())
                    .unwrap_or_default(),
                None => String::new(),
            },
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Whether the step at a 1-based index is complete. Unknown indices fail closed.
pub fn is_step_complete(step: u8, answers: &AnswerSet) -> bool {
    Step::from_index(step).is_some_and(|s| s.is_complete(answers))
}

/// Where to resume a hydrated answer set: one past the furthest complete step,
/// capped at the last step.
pub fn resume_step(answers: &AnswerSet) -> Step {
    Step::ALL
        .iter()
        .rev()
        .find(|s| s.is_complete(answers))
        .map(|s| s.next().unwrap_or(Step::LAST))
        .unwrap_or(Step::FIRST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::options::{
        AvailableCapital, BusinessJourney, InterestReason, MainGoal, MultiAnswer, Readiness,
        SingleAnswer, StrategyCallCommitment, SupportNeeded, TimeCommitment,
    };

    fn fill(step: Step, answers: &mut AnswerSet) {
        match step {
            Step::BusinessJourney => {
                answers.set_single(SingleAnswer::BusinessJourney(BusinessJourney::LookedIntoSolar))
            }
            Step::InterestReasons => {
                answers.toggle_multi(MultiAnswer::InterestReason(InterestReason::ProvenSystem));
            }
            Step::AvailableCapital => {
                answers.set_single(SingleAnswer::AvailableCapital(AvailableCapital::Over50k))
            }
            Step::MainGoal => answers.set_single(SingleAnswer::MainGoal(MainGoal::SecondIncome)),
            Step::TimeCommitment => {
                answers.set_single(SingleAnswer::TimeCommitment(TimeCommitment::Yes))
            }
            Step::ReadyToMoveForward => {
                answers.set_single(SingleAnswer::ReadyToMoveForward(Readiness::WithinTwoWeeks))
            }
            Step::SupportNeeded => {
                answers.toggle_multi(MultiAnswer::SupportNeeded(SupportNeeded::Scalability));
            }
            Step::StrategyCallCommitment => answers.set_single(
                SingleAnswer::StrategyCallCommitment(StrategyCallCommitment::Yes),
            ),
            Step::FullName => {
                answers.first_name = "Jane".into();
                answers.last_name = "Doe".into();
            }
            Step::Email => answers.email = "jane@x.com".into(),
            Step::Phone => answers.phone = "(555) 123-4567".into(),
        }
    }

    #[test]
    fn index_round_trip() {
        for step in Step::ALL {
            assert_eq!(Step::from_index(step.index()), Some(step));
        }
        assert_eq!(Step::FIRST.index(), 1);
        assert_eq!(Step::LAST.index(), 11);
        assert_eq!(Step::from_index(0), None);
        assert_eq!(Step::from_index(12), None);
        assert_eq!(Step::FIRST.prev(), None);
        assert_eq!(Step::LAST.next(), None);
    }

    #[test]
    fn every_step_incomplete_when_empty_and_complete_when_filled() {
        for step in Step::ALL {
            let mut answers = AnswerSet::default();
            assert!(!step.is_complete(&answers), "step {step} should start incomplete");
            fill(step, &mut answers);
            assert!(step.is_complete(&answers), "step {step} should be complete");
        }
    }

    #[test]
    fn support_other_requires_elaboration() {
        let mut answers = AnswerSet::default();
        answers.toggle_multi(MultiAnswer::SupportNeeded(SupportNeeded::BusinessModel));
        answers.toggle_multi(MultiAnswer::SupportNeeded(SupportNeeded::Other));
        assert!(!is_step_complete(7, &answers));

        answers.other_support_needed = "   ".into();
        assert!(!is_step_complete(7, &answers));

        answers.other_support_needed = "Financing".into();
        assert!(is_step_complete(7, &answers));
    }

    #[test]
    fn full_name_requires_both_parts_after_trim() {
        let mut answers = AnswerSet {
            first_name: "Jane".into(),
            last_name: "  ".into(),
            ..Default::default()
        };
        assert!(!is_step_complete(9, &answers));
        answers.last_name = "Doe".into();
        assert!(is_step_complete(9, &answers));
    }

    #[test]
    fn email_step_requires_valid_syntax() {
        let mut answers = AnswerSet {
            email: "jane@x".into(),
            ..Default::default()
        };
        assert!(!is_step_complete(10, &answers));
        answers.email = "  jane@x.com ".into();
        assert!(is_step_complete(10, &answers));
    }

    #[test]
    fn unknown_step_fails_closed() {
        let mut answers = AnswerSet::default();
        for step in Step::ALL {
            fill(step, &mut answers);
        }
        assert!(!is_step_complete(0, &answers));
        assert!(!is_step_complete(12, &answers));
        assert!(!is_step_complete(255, &answers));
    }

    #[test]
    fn resume_step_follows_furthest_answer() {
        let mut answers = AnswerSet::default();
        assert_eq!(resume_step(&answers), Step::BusinessJourney);

        fill(Step::BusinessJourney, &mut answers);
        fill(Step::InterestReasons, &mut answers);
        assert_eq!(resume_step(&answers), Step::AvailableCapital);

        fill(Step::StrategyCallCommitment, &mut answers);
        assert_eq!(resume_step(&answers), Step::FullName);
    }

    #[test]
    fn resume_step_is_capped_at_last_step() {
        let mut answers = AnswerSet::default();
        for step in Step::ALL {
            fill(step, &mut answers);
        }
        assert_eq!(resume_step(&answers), Step::Phone);
    }

    #[test]
    fn answer_summary_per_kind() {
        let mut answers = AnswerSet::default();
        fill(Step::AvailableCapital, &mut answers);
        fill(Step::FullName, &mut answers);
        answers.toggle_multi(MultiAnswer::InterestReason(InterestReason::TimeFreedom));
        answers.toggle_multi(MultiAnswer::InterestReason(InterestReason::IncomeOutsideNineToFive));

        assert_eq!(Step::AvailableCapital.answer_summary(&answers), "$50,000+");
        assert_eq!(Step::FullName.answer_summary(&answers), "Jane Doe");
        assert_eq!(
            Step::InterestReasons.answer_summary(&answers),
            "I want to build income outside of a 9–5, I want time freedom and location flexibility"
        );
        assert_eq!(Step::MainGoal.answer_summary(&answers), "");
    }
}
