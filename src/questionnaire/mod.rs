//! Questionnaire model: option catalogue, answer set, and step rules.

pub mod answers;
pub mod options;
pub mod steps;

pub use answers::{AnswerSet, TextField};
pub use options::{
    AvailableCapital, BusinessJourney, InterestReason, MainGoal, MultiAnswer, OTHER_LABEL,
    Question, QuestionOption, Readiness, SingleAnswer, StrategyCallCommitment, SupportNeeded,
    TimeCommitment,
};
pub use steps::{Step, is_step_complete, resume_step};
