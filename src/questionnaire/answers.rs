//! The answer set collected by the wizard.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::attribution::Variant;

use super::options::{
    AvailableCapital, BusinessJourney, InterestReason, MainGoal, MultiAnswer, Question,
    QuestionOption, Readiness, SingleAnswer, StrategyCallCommitment, SupportNeeded,
    TimeCommitment,
};

/// Free-text inputs the user types into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    FirstName,
    LastName,
    Email,
    ConfirmEmail,
    Phone,
    OtherSupportNeeded,
}

/// Everything the questionnaire knows about one lead.
///
/// Serialized with the same camelCase keys the snapshot and the sinks use.
/// Deserialization is lenient field by field: unknown option labels, empty
/// strings and wrongly-typed values read as "unset" instead of failing the
/// whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerSet {
    #[serde(deserialize_with = "lenient::text")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub confirm_email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,

    #[serde(with = "lenient::single")]
    pub business_journey: Option<BusinessJourney>,
    #[serde(with = "lenient::multi")]
    pub interest_reasons: BTreeSet<InterestReason>,
    #[serde(with = "lenient::single")]
    pub available_capital: Option<AvailableCapital>,
    #[serde(with = "lenient::single")]
    pub main_goal: Option<MainGoal>,
    #[serde(with = "lenient::single")]
    pub time_commitment: Option<TimeCommitment>,
    #[serde(with = "lenient::single")]
    pub ready_to_move_forward: Option<Readiness>,
    #[serde(with = "lenient::multi")]
    pub support_needed: BTreeSet<SupportNeeded>,
    #[serde(with = "lenient::single")]
    pub strategy_call_commitment: Option<StrategyCallCommitment>,
    #[serde(deserialize_with = "lenient::text")]
    pub other_support_needed: String,

    /// Click identifier (`fb.1.<millis>.<fbclid>`).
    #[serde(deserialize_with = "lenient::text")]
    pub fbc: String,
    /// Browser identifier from the `_fbp` cookie.
    #[serde(deserialize_with = "lenient::text")]
    pub fbp: String,
    #[serde(deserialize_with = "lenient::text")]
    pub user_agent: String,
    #[serde(deserialize_with = "lenient::text")]
    pub ip: String,
    #[serde(rename = "ab_variant", with = "lenient::single")]
    pub ab_variant: Option<Variant>,
}

impl AnswerSet {
    /// Store a single-select answer, replacing any previous choice.
    pub fn set_single(&mut self, answer: SingleAnswer) {
        match answer {
            SingleAnswer::BusinessJourney(o) => self.business_journey = Some(o),
            SingleAnswer::AvailableCapital(o) => self.available_capital = Some(o),
            SingleAnswer::MainGoal(o) => self.main_goal = Some(o),
            SingleAnswer::TimeCommitment(o) => self.time_commitment = Some(o),
            SingleAnswer::ReadyToMoveForward(o) => self.ready_to_move_forward = Some(o),
            SingleAnswer::StrategyCallCommitment(o) => self.strategy_call_commitment = Some(o),
        }
    }

    /// Current answer for a single-select question.
    pub fn single(&self, question: Question) -> Option<SingleAnswer> {
        match question {
            Question::BusinessJourney => self.business_journey.map(SingleAnswer::BusinessJourney),
            Question::AvailableCapital => {
                self.available_capital.map(SingleAnswer::AvailableCapital)
            }
            Question::MainGoal => self.main_goal.map(SingleAnswer::MainGoal),
            Question::TimeCommitment => self.time_commitment.map(SingleAnswer::TimeCommitment),
            Question::ReadyToMoveForward => {
                self.ready_to_move_forward.map(SingleAnswer::ReadyToMoveForward)
            }
            Question::StrategyCallCommitment => self
                .strategy_call_commitment
                .map(SingleAnswer::StrategyCallCommitment),
            Question::InterestReasons | Question::SupportNeeded => None,
        }
    }

    /// Every single-select answer given so far, in step order.
    pub fn single_answers(&self) -> Vec<SingleAnswer> {
        [
            Question::BusinessJourney,
            Question::AvailableCapital,
            Question::MainGoal,
            Question::TimeCommitment,
            Question::ReadyToMoveForward,
            Question::StrategyCallCommitment,
        ]
        .into_iter()
        .filter_map(|q| self.single(q))
        .collect()
    }

    /// Toggle membership of a multi-select value. Returns whether it is now selected.
    pub fn toggle_multi(&mut self, answer: MultiAnswer) -> bool {
        fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
            if set.remove(&value) {
                false
            } else {
                set.insert(value);
                true
            }
        }
        match answer {
            MultiAnswer::InterestReason(o) => toggle(&mut self.interest_reasons, o),
            MultiAnswer::SupportNeeded(o) => toggle(&mut self.support_needed, o),
        }
    }

    /// Selected labels of a multi-select question.
    pub fn multi_labels(&self, question: Question) -> Vec<&'static str> {
        match question {
            Question::InterestReasons => self.interest_reasons.iter().map(|o| o.label()).collect(),
            Question::SupportNeeded => self.support_needed.iter().map(|o| o.label()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::FirstName => &self.first_name,
            TextField::LastName => &self.last_name,
            TextField::Email => &self.email,
            TextField::ConfirmEmail => &self.confirm_email,
            TextField::Phone => &self.phone,
            TextField::OtherSupportNeeded => &self.other_support_needed,
        }
    }

    pub fn set_text(&mut self, field: TextField, value: String) {
        let slot = match field {
            TextField::FirstName => &mut self.first_name,
            TextField::LastName => &mut self.last_name,
            TextField::Email => &mut self.email,
            TextField::ConfirmEmail => &mut self.confirm_email,
            TextField::Phone => &mut self.phone,
            TextField::OtherSupportNeeded => &mut self.other_support_needed,
        };
        *slot = value;
    }

    /// `"First Last"`, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether at least one questionnaire (non-contact) field is answered.
    pub fn has_questionnaire_answers(&self) -> bool {
        !self.single_answers().is_empty()
            || !self.interest_reasons.is_empty()
            || !self.support_needed.is_empty()
    }
}

/// Field-level lenient (de)serializers for persisted snapshots.
mod lenient {
    use std::collections::BTreeSet;

    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    /// Strings pass through, numbers and booleans are stringified, anything else is empty.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    pub mod single {
        use super::*;

        /// Unset serializes as `""`, matching what older snapshots contain.
        pub fn serialize<T: Serialize, S: Serializer>(
            value: &Option<T>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => v.serialize(serializer),
                None => serializer.serialize_str(""),
            }
        }

        pub fn deserialize<'de, T: DeserializeOwned, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<T>, D::Error> {
            let value = Value::deserialize(deserializer)?;
            match value {
                Value::Null => Ok(None),
                Value::String(ref s) if s.is_empty() => Ok(None),
                other => Ok(serde_json::from_value(other).ok()),
            }
        }
    }

    pub mod multi {
        use super::*;

        pub fn serialize<T: Serialize, S: Serializer>(
            value: &BTreeSet<T>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(value)
        }

        /// Non-arrays read as empty; unknown entries are dropped.
        pub fn deserialize<'de, T: DeserializeOwned + Ord, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BTreeSet<T>, D::Error> {
            Ok(match Value::deserialize(deserializer)? {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
                _ => BTreeSet::new(),
            })
        }
    }
}
