//! Disqualification rules.
//!
//! A lead is disqualified when any single-select answer matches a rule:
//! - available capital below $20,000
//! - "just exploring" readiness
//! - no firm commitment to the strategy call
//!
//! The per-click check and the final submission check both go through
//! [`is_disqualifying`], so they cannot disagree.

use tracing::debug;

use crate::questionnaire::{
    AnswerSet, AvailableCapital, Readiness, SingleAnswer, StrategyCallCommitment,
};

/// The single rule predicate shared by every evaluation mode.
pub fn is_disqualifying(answer: &SingleAnswer) -> bool {
    match answer {
        SingleAnswer::AvailableCapital(capital) => matches!(
            capital,
            AvailableCapital::LessThan10k | AvailableCapital::From10kTo20k
        ),
        SingleAnswer::ReadyToMoveForward(readiness) => {
            matches!(readiness, Readiness::JustExploring)
        }
        SingleAnswer::StrategyCallCommitment(commitment) => matches!(
            commitment,
            StrategyCallCommitment::No | StrategyCallCommitment::OnlyIfFit
        ),
        SingleAnswer::BusinessJourney(_)
        | SingleAnswer::MainGoal(_)
        | SingleAnswer::TimeCommitment(_) => false,
    }
}

/// Evaluate a proposed answer before it is committed.
pub fn would_disqualify(answer: &SingleAnswer) -> bool {
    let hit = is_disqualifying(answer);
    if hit {
        debug!(
            question = %answer.question(),
            answer = answer.label(),
            "Proposed answer disqualifies the lead"
        );
    }
    hit
}

/// The first committed answer that disqualifies the lead, in step order.
pub fn first_disqualification(answers: &AnswerSet) -> Option<SingleAnswer> {
    answers
        .single_answers()
        .into_iter()
        .find(|a| is_disqualifying(a))
}

/// Authoritative qualified/disqualified decision over the full answer set.
pub fn is_disqualified(answers: &AnswerSet) -> bool {
    first_disqualification(answers).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{
        BusinessJourney, MainGoal, Question, QuestionOption, TimeCommitment,
    };

    #[test]
    fn capital_rules() {
        for capital in AvailableCapital::ALL {
            let expected = matches!(
                capital,
                AvailableCapital::LessThan10k | AvailableCapital::From10kTo20k
            );
            assert_eq!(
                would_disqualify(&SingleAnswer::AvailableCapital(*capital)),
                expected,
                "{capital}"
            );
        }
    }

    #[test]
    fn readiness_and_strategy_call_rules() {
        assert!(would_disqualify(&SingleAnswer::ReadyToMoveForward(Readiness::JustExploring)));
        assert!(!would_disqualify(&SingleAnswer::ReadyToMoveForward(Readiness::Within30Days)));
        assert!(would_disqualify(&SingleAnswer::StrategyCallCommitment(
            StrategyCallCommitment::No
        )));
        assert!(would_disqualify(&SingleAnswer::StrategyCallCommitment(
            StrategyCallCommitment::OnlyIfFit
        )));
        assert!(!would_disqualify(&SingleAnswer::StrategyCallCommitment(
            StrategyCallCommitment::Yes
        )));
    }

    #[test]
    fn non_rule_questions_never_disqualify() {
        for option in MainGoal::ALL {
            assert!(!would_disqualify(&SingleAnswer::MainGoal(*option)));
        }
        for option in TimeCommitment::ALL {
            assert!(!would_disqualify(&SingleAnswer::TimeCommitment(*option)));
        }
        for option in BusinessJourney::ALL {
            assert!(!would_disqualify(&SingleAnswer::BusinessJourney(*option)));
        }
    }

    #[test]
    fn per_click_and_final_evaluation_agree() {
        let candidates = [
            SingleAnswer::AvailableCapital(AvailableCapital::LessThan10k),
            SingleAnswer::AvailableCapital(AvailableCapital::From30kTo50k),
            SingleAnswer::ReadyToMoveForward(Readiness::JustExploring),
            SingleAnswer::StrategyCallCommitment(StrategyCallCommitment::Yes),
            SingleAnswer::TimeCommitment(TimeCommitment::No),
        ];
        for candidate in candidates {
            let mut answers = AnswerSet::default();
            answers.set_single(candidate);
            assert_eq!(would_disqualify(&candidate), is_disqualified(&answers));
        }
    }

    #[test]
    fn qualified_lead() {
        let mut answers = AnswerSet::default();
        answers.set_single(SingleAnswer::AvailableCapital(AvailableCapital::From30kTo50k));
        answers.set_single(SingleAnswer::ReadyToMoveForward(Readiness::Within30Days));
        answers.set_single(SingleAnswer::StrategyCallCommitment(StrategyCallCommitment::Yes));
        assert!(!is_disqualified(&answers));
        assert!(first_disqualification(&answers).is_none());
    }

    #[test]
    fn first_disqualification_reports_earliest_step() {
        let mut answers = AnswerSet::default();
        answers.set_single(SingleAnswer::StrategyCallCommitment(StrategyCallCommitment::No));
        answers.set_single(SingleAnswer::AvailableCapital(AvailableCapital::From10kTo20k));
        let hit = first_disqualification(&answers).unwrap();
        assert_eq!(hit.question(), Question::AvailableCapital);
        assert_eq!(hit.label(), "$10,000–$20,000");
    }
}
