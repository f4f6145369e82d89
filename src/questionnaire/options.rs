//! Closed option sets for every select question.
//!
//! Each option serializes as its display label, which is also the value the
//! sinks receive and the value found in persisted snapshots.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label of the escape option that asks for a free-text elaboration.
pub const OTHER_LABEL: &str = "Other (specify below)";

/// Common behaviour of every option enum.
pub trait QuestionOption: Copy + Eq + Ord + std::fmt::Debug + 'static {
    /// Every option, in display order.
    const ALL: &'static [Self];

    /// Display label.
    fn label(&self) -> &'static str;

    /// Look up an option by its exact label.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|o| o.label() == label)
    }

    /// Whether this is the "Other (specify below)" escape option.
    fn is_other(&self) -> bool {
        self.label() == OTHER_LABEL
    }
}

macro_rules! question_options {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl QuestionOption for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                Self::from_label(&label).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} option: {label}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

question_options! {
    /// Step 1: where the lead is in their business journey.
    BusinessJourney {
        TriedOnlineBusinesses => "I've tried other online businesses but nothing stuck",
        RunBusinessWantPassive => "I currently run a business but want something more passive",
        LookedIntoSolar => "I've looked into solar but never took action",
        ActivelyLooking => "I'm actively looking for the right opportunity to invest in",
        Other => OTHER_LABEL,
    }
}

question_options! {
    /// Step 2 (multi-select): why the opportunity is interesting.
    InterestReason {
        IncomeOutsideNineToFive => "I want to build income outside of a 9–5",
        MoreStable => "I'm looking for something more stable than crypto/eComm/etc",
        ProvenSystem => "I want a proven system I don't have to build from scratch",
        TimeFreedom => "I want time freedom and location flexibility",
        CleanEnergyGrowth => "I'm interested in the long-term growth of clean energy",
    }
}

question_options! {
    /// Step 3: capital available to invest.
    AvailableCapital {
        LessThan10k => "Less than $10,000",
        From10kTo20k => "$10,000–$20,000",
        From20kTo30k => "$20,000–$30,000",
        From30kTo50k => "$30,000–$50,000",
        Over50k => "$50,000+",
    }
}

question_options! {
    /// Step 4: primary goal.
    MainGoal {
        SecondIncome => "Build a second income stream",
        LeaveJob => "Transition out of my job",
        ReplaceIncome => "Replace or surpass my current income",
        HandsFreeIncome => "Build long-term, hands-free income",
        NotSure => "Not sure yet — just exploring",
    }
}

question_options! {
    /// Step 5: willingness to commit weekly time.
    TimeCommitment {
        Yes => "Yes",
        No => "No",
        Depends => "Depends on what that looks like",
    }
}

question_options! {
    /// Step 6: how soon the lead is ready to move forward.
    Readiness {
        WithinTwoWeeks => "Within 1–2 weeks",
        Within30Days => "Within 30 days",
        JustExploring => "Just exploring — not sure yet",
    }
}

question_options! {
    /// Step 7 (multi-select): topics the lead wants help with.
    SupportNeeded {
        BusinessModel => "Understanding the business model and earning potential",
        LeadGeneration => "How we generate and qualify solar leads",
        LegalCompliance => "Legal, compliance, and business structure",
        WeeklyTime => "What the weekly time commitment looks like",
        Scalability => "Long-term scalability and exit potential",
        Other => OTHER_LABEL,
    }
}

question_options! {
    /// Step 8: commitment to attend the strategy call.
    StrategyCallCommitment {
        Yes => "Yes",
        No => "No",
        OnlyIfFit => "Only if I feel like it's a fit after watching the video",
    }
}

/// Identifier of a select question, named by its snapshot/payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Question {
    BusinessJourney,
    InterestReasons,
    AvailableCapital,
    MainGoal,
    TimeCommitment,
    ReadyToMoveForward,
    SupportNeeded,
    StrategyCallCommitment,
}

impl Question {
    /// JSON key used in snapshots and payloads.
    pub fn key(&self) -> &'static str {
        match self {
            Self::BusinessJourney => "businessJourney",
            Self::InterestReasons => "interestReasons",
            Self::AvailableCapital => "availableCapital",
            Self::MainGoal => "mainGoal",
            Self::TimeCommitment => "timeCommitment",
            Self::ReadyToMoveForward => "readyToMoveForward",
            Self::SupportNeeded => "supportNeeded",
            Self::StrategyCallCommitment => "strategyCallCommitment",
        }
    }

    /// Whether the question accepts several options.
    pub fn is_multi_select(&self) -> bool {
        matches!(self, Self::InterestReasons | Self::SupportNeeded)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A proposed answer to a single-select question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleAnswer {
    BusinessJourney(BusinessJourney),
    AvailableCapital(AvailableCapital),
    MainGoal(MainGoal),
    TimeCommitment(TimeCommitment),
    ReadyToMoveForward(Readiness),
    StrategyCallCommitment(StrategyCallCommitment),
}

impl SingleAnswer {
    pub fn question(&self) -> Question {
        match self {
            Self::BusinessJourney(_) => Question::BusinessJourney,
            Self::AvailableCapital(_) => Question::AvailableCapital,
            Self::MainGoal(_) => Question::MainGoal,
            Self::TimeCommitment(_) => Question::TimeCommitment,
            Self::ReadyToMoveForward(_) => Question::ReadyToMoveForward,
            Self::StrategyCallCommitment(_) => Question::StrategyCallCommitment,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BusinessJourney(o) => o.label(),
            Self::AvailableCapital(o) => o.label(),
            Self::MainGoal(o) => o.label(),
            Self::TimeCommitment(o) => o.label(),
            Self::ReadyToMoveForward(o) => o.label(),
            Self::StrategyCallCommitment(o) => o.label(),
        }
    }

    /// Whether the chosen option is the "Other (specify below)" escape.
    pub fn is_other(&self) -> bool {
        match self {
            Self::BusinessJourney(o) => o.is_other(),
            Self::AvailableCapital(o) => o.is_other(),
            Self::MainGoal(o) => o.is_other(),
            Self::TimeCommitment(o) => o.is_other(),
            Self::ReadyToMoveForward(o) => o.is_other(),
            Self::StrategyCallCommitment(o) => o.is_other(),
        }
    }

    /// Parse a label for the given question. `None` for multi-select questions
    /// or labels outside the option set.
    pub fn parse(question: Question, label: &str) -> Option<Self> {
        match question {
            Question::BusinessJourney => BusinessJourney::from_label(label).map(Self::BusinessJourney),
            Question::AvailableCapital => {
                AvailableCapital::from_label(label).map(Self::AvailableCapital)
            }
            Question::MainGoal => MainGoal::from_label(label).map(Self::MainGoal),
            Question::TimeCommitment => TimeCommitment::from_label(label).map(Self::TimeCommitment),
            Question::ReadyToMoveForward => {
                Readiness::from_label(label).map(Self::ReadyToMoveForward)
            }
            Question::StrategyCallCommitment => {
                StrategyCallCommitment::from_label(label).map(Self::StrategyCallCommitment)
            }
            Question::InterestReasons | Question::SupportNeeded => None,
        }
    }
}

/// A value toggled on a multi-select question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiAnswer {
    InterestReason(InterestReason),
    SupportNeeded(SupportNeeded),
}

impl MultiAnswer {
    pub fn question(&self) -> Question {
        match self {
            Self::InterestReason(_) => Question::InterestReasons,
            Self::SupportNeeded(_) => Question::SupportNeeded,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InterestReason(o) => o.label(),
            Self::SupportNeeded(o) => o.label(),
        }
    }

    pub fn parse(question: Question, label: &str) -> Option<Self> {
        match question {
            Question::InterestReasons => InterestReason::from_label(label).map(Self::InterestReason),
            Question::SupportNeeded => SupportNeeded::from_label(label).map(Self::SupportNeeded),
            _ => None,
        }
    }
}

/// Option labels for a select question, in display order.
pub fn labels_for(question: Question) -> Vec<&'static str> {
    fn labels<T: QuestionOption>() -> Vec<&'static str> {
        T::ALL.iter().map(|o| o.label()).collect()
    }
    match question {
        Question::BusinessJourney => labels::<BusinessJourney>(),
        Question::InterestReasons => labels::<InterestReason>(),
        Question::AvailableCapital => labels::<AvailableCapital>(),
        Question::MainGoal => labels::<MainGoal>(),
        Question::TimeCommitment => labels::<TimeCommitment>(),
        Question::ReadyToMoveForward => labels::<Readiness>(),
        Question::SupportNeeded => labels::<SupportNeeded>(),
        Question::StrategyCallCommitment => labels::<StrategyCallCommitment>(),
    }
}
