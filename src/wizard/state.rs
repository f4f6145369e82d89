//! Wizard state machine: where the visitor is and what each event does.
//!
//! `transition` is pure. It never touches storage, sinks or timers; it
//! returns the next state plus a list of [`Effect`]s for the controller to
//! carry out in order. Events that do not apply to the current state are
//! no-ops: the state is unchanged and no effects are produced.

use crate::format::format_phone_number;
use crate::questionnaire::{AnswerSet, MultiAnswer, SingleAnswer, Step, TextField};
use crate::rules;
use crate::submission::RedirectTarget;

/// Single-select answers on steps past this one never auto-advance.
const AUTO_ADVANCE_BEFORE: u8 = 10;

/// Position of the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    /// Showing a question.
    Step(Step),
    /// Final submission in flight.
    Submitting,
    /// A disqualifying answer was chosen; the partial lead is being sent.
    DisqualifiedRedirect,
    /// Terminal. The page has navigated away.
    Redirected(RedirectTarget),
}

impl WizardState {
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Step(step) => Some(*step),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirected(_))
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Step(Step::FIRST)
    }
}

impl std::fmt::Display for WizardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Step(step) => write!(f, "step_{step}"),
            Self::Submitting => write!(f, "submitting"),
            Self::DisqualifiedRedirect => write!(f, "disqualified_redirect"),
            Self::Redirected(_) => write!(f, "redirected"),
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// "Continue" button.
    Advance,
    /// "Back" button.
    Retreat,
    SelectSingle(SingleAnswer),
    ToggleMulti(MultiAnswer),
    SetText(TextField, String),
    Submit,
    /// The auto-advance delay after a single-select click elapsed.
    AutoAdvance,
    /// Submission or the disqualified dispatch finished.
    Finish(RedirectTarget),
    /// Submission was blocked by validation.
    SubmitRejected,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetSingle(SingleAnswer),
    ToggleMulti(MultiAnswer),
    SetText(TextField, String),
    ContinueClicked { step: Step, answer: String },
    ResetQuestionTimer,
    ScheduleAutoAdvance,
    NotifyDisqualified { reason: SingleAnswer, step: Step },
    BeginSubmission,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: WizardState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: WizardState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn stay(state: &WizardState) -> Self {
        Self::to(state.clone(), Vec::new())
    }

    pub fn is_noop(&self, from: &WizardState) -> bool {
        &self.next == from && self.effects.is_empty()
    }
}

/// The step whose screen owns a text field.
pub fn step_for_field(field: TextField) -> Step {
    match field {
        TextField::FirstName | TextField::LastName => Step::FullName,
        TextField::Email | TextField::ConfirmEmail => Step::Email,
        TextField::Phone => Step::Phone,
        TextField::OtherSupportNeeded => Step::SupportNeeded,
    }
}

/// Apply `event` to `state` given the current answers.
pub fn transition(state: &WizardState, event: &WizardEvent, answers: &AnswerSet) -> Transition {
    use WizardEvent as E;

    match (state, event) {
        (WizardState::Step(step), E::Advance) => match step.next() {
            Some(next) if step.is_complete(answers) => Transition::to(
                WizardState::Step(next),
                vec![
                    Effect::ContinueClicked {
                        step: *step,
                        answer: step.answer_summary(answers),
                    },
                    Effect::ResetQuestionTimer,
                ],
            ),
            _ => Transition::stay(state),
        },

        (WizardState::Step(step), E::AutoAdvance) => match step.next() {
            Some(next) if step.is_complete(answers) => {
                Transition::to(WizardState::Step(next), vec![Effect::ResetQuestionTimer])
            }
            _ => Transition::stay(state),
        },

        (WizardState::Step(step), E::Retreat) => match step.prev() {
            Some(prev) => Transition::to(WizardState::Step(prev), Vec::new()),
            None => Transition::stay(state),
        },

        (WizardState::Step(step), E::SelectSingle(answer))
            if step.question() == Some(answer.question()) =>
        {
            let mut effects = vec![Effect::SetSingle(*answer)];
            if rules::would_disqualify(answer) {
                effects.push(Effect::NotifyDisqualified {
                    reason: *answer,
                    step: *step,
                });
                return Transition::to(WizardState::DisqualifiedRedirect, effects);
            }
            if !answer.is_other() && step.index() < AUTO_ADVANCE_BEFORE {
                effects.push(Effect::ContinueClicked {
                    step: *step,
                    answer: answer.label().to_string(),
                });
                effects.push(Effect::ScheduleAutoAdvance);
            }
            Transition::to(state.clone(), effects)
        }

        (WizardState::Step(step), E::ToggleMulti(answer))
            if step.question() == Some(answer.question()) =>
        {
            Transition::to(state.clone(), vec![Effect::ToggleMulti(*answer)])
        }

        (WizardState::Step(step), E::SetText(field, value)) if step_for_field(*field) == *step => {
            let value = match field {
                TextField::Phone => format_phone_number(value),
                _ => value.clone(),
            };
            Transition::to(state.clone(), vec![Effect::SetText(*field, value)])
        }

        (WizardState::Step(Step::LAST), E::Submit) if Step::LAST.is_complete(answers) => {
            Transition::to(WizardState::Submitting, vec![Effect::BeginSubmission])
        }

        (WizardState::Submitting | WizardState::DisqualifiedRedirect, E::Finish(target)) => {
            Transition::to(WizardState::Redirected(target.clone()), Vec::new())
        }

        (WizardState::Submitting, E::SubmitRejected) => {
            Transition::to(WizardState::Step(Step::LAST), Vec::new())
        }

        _ => Transition::stay(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{
        AvailableCapital, BusinessJourney, InterestReason, MainGoal, QuestionOption, Readiness,
        SupportNeeded,
    };

    fn at(step: Step) -> WizardState {
        WizardState::Step(step)
    }

    #[test]
    fn advance_requires_complete_step() {
        let answers = AnswerSet::default();
        let t = transition(&at(Step::BusinessJourney), &WizardEvent::Advance, &answers);
        assert!(t.is_noop(&at(Step::BusinessJourney)));

        let mut answers = AnswerSet::default();
        answers.set_single(SingleAnswer::BusinessJourney(BusinessJourney::ActivelyLooking));
        let t = transition(&at(Step::BusinessJourney), &WizardEvent::Advance, &answers);
        assert_eq!(t.next, at(Step::InterestReasons));
        assert_eq!(
            t.effects,
            vec![
                Effect::ContinueClicked {
                    step: Step::BusinessJourney,
                    answer: BusinessJourney::ActivelyLooking.label().to_string(),
                },
                Effect::ResetQuestionTimer,
            ]
        );
    }

    #[test]
    fn advance_never_passes_the_last_step() {
        let answers = AnswerSet {
            phone: "(555) 123-4567".into(),
            ..Default::default()
        };
        let t = transition(&at(Step::Phone), &WizardEvent::Advance, &answers);
        assert!(t.is_noop(&at(Step::Phone)));
    }

    #[test]
    fn retreat_stops_at_first_step() {
        let answers = AnswerSet::default();
        let t = transition(&at(Step::MainGoal), &WizardEvent::Retreat, &answers);
        assert_eq!(t.next, at(Step::AvailableCapital));
        assert!(t.effects.is_empty());

        let t = transition(&at(Step::BusinessJourney), &WizardEvent::Retreat, &answers);
        assert!(t.is_noop(&at(Step::BusinessJourney)));
    }

    #[test]
    fn single_select_schedules_auto_advance() {
        let answer = SingleAnswer::MainGoal(MainGoal::LeaveJob);
        let t = transition(&at(Step::MainGoal), &WizardEvent::SelectSingle(answer), &AnswerSet::default());
        assert_eq!(t.next, at(Step::MainGoal));
        assert_eq!(
            t.effects,
            vec![
                Effect::SetSingle(answer),
                Effect::ContinueClicked {
                    step: Step::MainGoal,
                    answer: "Transition out of my job".into(),
                },
                Effect::ScheduleAutoAdvance,
            ]
        );
    }

    #[test]
    fn other_option_never_auto_advances() {
        let answer = SingleAnswer::BusinessJourney(BusinessJourney::Other);
        let t = transition(
            &at(Step::BusinessJourney),
            &WizardEvent::SelectSingle(answer),
            &AnswerSet::default(),
        );
        assert_eq!(t.effects, vec![Effect::SetSingle(answer)]);
    }

    #[test]
    fn disqualifying_select_leaves_the_questionnaire() {
        let answer = SingleAnswer::AvailableCapital(AvailableCapital::LessThan10k);
        let t = transition(
            &at(Step::AvailableCapital),
            &WizardEvent::SelectSingle(answer),
            &AnswerSet::default(),
        );
        assert_eq!(t.next, WizardState::DisqualifiedRedirect);
        assert_eq!(
            t.effects,
            vec![
                Effect::SetSingle(answer),
                Effect::NotifyDisqualified {
                    reason: answer,
                    step: Step::AvailableCapital,
                },
            ]
        );
        assert!(!t.effects.contains(&Effect::ScheduleAutoAdvance));

        let t = transition(
            &WizardState::DisqualifiedRedirect,
            &WizardEvent::Finish(RedirectTarget::Disqualified),
            &AnswerSet::default(),
        );
        assert_eq!(t.next, WizardState::Redirected(RedirectTarget::Disqualified));
    }

    #[test]
    fn answers_for_other_steps_are_ignored() {
        let answer = SingleAnswer::ReadyToMoveForward(Readiness::JustExploring);
        let t = transition(&at(Step::MainGoal), &WizardEvent::SelectSingle(answer), &AnswerSet::default());
        assert!(t.is_noop(&at(Step::MainGoal)));

        let toggle = MultiAnswer::SupportNeeded(SupportNeeded::Scalability);
        let t = transition(&at(Step::InterestReasons), &WizardEvent::ToggleMulti(toggle), &AnswerSet::default());
        assert!(t.is_noop(&at(Step::InterestReasons)));

        let t = transition(
            &at(Step::Email),
            &WizardEvent::SetText(TextField::Phone, "555".into()),
            &AnswerSet::default(),
        );
        assert!(t.is_noop(&at(Step::Email)));
    }

    #[test]
    fn toggle_multi_never_advances_or_disqualifies() {
        let toggle = MultiAnswer::InterestReason(InterestReason::MoreStable);
        let t = transition(&at(Step::InterestReasons), &WizardEvent::ToggleMulti(toggle), &AnswerSet::default());
        assert_eq!(t.next, at(Step::InterestReasons));
        assert_eq!(t.effects, vec![Effect::ToggleMulti(toggle)]);
    }

    #[test]
    fn phone_input_is_masked() {
        let t = transition(
            &at(Step::Phone),
            &WizardEvent::SetText(TextField::Phone, "555-123-4567".into()),
            &AnswerSet::default(),
        );
        assert_eq!(
            t.effects,
            vec![Effect::SetText(TextField::Phone, "(555) 123-4567".into())]
        );
    }

    #[test]
    fn submit_only_from_complete_last_step() {
        let empty = AnswerSet::default();
        assert!(transition(&at(Step::Phone), &WizardEvent::Submit, &empty).is_noop(&at(Step::Phone)));
        assert!(transition(&at(Step::Email), &WizardEvent::Submit, &empty).is_noop(&at(Step::Email)));

        let answers = AnswerSet {
            phone: "(555) 123-4567".into(),
            ..Default::default()
        };
        let t = transition(&at(Step::Phone), &WizardEvent::Submit, &answers);
        assert_eq!(t.next, WizardState::Submitting);
        assert_eq!(t.effects, vec![Effect::BeginSubmission]);

        let t = transition(&WizardState::Submitting, &WizardEvent::SubmitRejected, &answers);
        assert_eq!(t.next, at(Step::Phone));
    }

    #[test]
    fn redirected_is_terminal() {
        let done = WizardState::Redirected(RedirectTarget::Entry);
        assert!(done.is_terminal());
        let answers = AnswerSet::default();
        for event in [
            WizardEvent::Advance,
            WizardEvent::Retreat,
            WizardEvent::Submit,
            WizardEvent::AutoAdvance,
            WizardEvent::SubmitRejected,
            WizardEvent::Finish(RedirectTarget::Disqualified),
            WizardEvent::SelectSingle(SingleAnswer::MainGoal(MainGoal::NotSure)),
        ] {
            assert!(transition(&done, &event, &answers).is_noop(&done), "{event:?}");
        }
    }
}
