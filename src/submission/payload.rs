//! The lead payload posted to every sink.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::attribution::{LandingAttribution, UtmParams, Variant};
use crate::config::FunnelConfig;
use crate::questionnaire::{AnswerSet, Question, SingleAnswer, Step};
use crate::rules;

use super::contact::Contact;

/// Name reported on a partial lead when none was entered yet.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Email reported on a partial lead when none was entered yet.
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// Attribution and provenance shared by every payload built in one session.
#[derive(Debug, Clone, Default)]
pub struct PayloadContext {
    pub landing: LandingAttribution,
    pub utm: UtmParams,
    /// Absolute URL of the page the lead submitted from.
    pub submitted_from: String,
}

/// One flat JSON object, identical for the API and the webhook sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadPayload {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub event_id: String,

    #[serde(rename = "businessJourney")]
    pub business_journey: String,
    #[serde(rename = "interestReasons")]
    pub interest_reasons: Vec<String>,
    #[serde(rename = "availableCapital")]
    pub available_capital: String,
    #[serde(rename = "mainGoal")]
    pub main_goal: String,
    #[serde(rename = "timeCommitment")]
    pub time_commitment: String,
    #[serde(rename = "readyToMoveForward")]
    pub ready_to_move_forward: String,
    #[serde(rename = "supportNeeded")]
    pub support_needed: Vec<String>,
    #[serde(rename = "otherSupportNeeded")]
    pub other_support_needed: String,
    #[serde(rename = "strategyCallCommitment")]
    pub strategy_call_commitment: String,

    pub source: String,
    pub timestamp: String,
    #[serde(rename = "submittedAt")]
    pub submitted_at: String,
    #[serde(rename = "submittedFrom")]
    pub submitted_from: String,
    pub qualified: bool,
    pub disqualified: bool,

    #[serde(rename = "visitedPath")]
    pub visited_path: String,
    #[serde(rename = "landingPageVariant")]
    pub landing_page_variant: Variant,
    pub ab_test_variant: &'static str,
    pub ab_test_path: String,
    pub is_variant_a: bool,
    pub is_variant_1: bool,
    pub is_root_redirect: bool,

    #[serde(flatten)]
    pub utm: UtmParams,

    pub fbc: Option<String>,
    pub fbp: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
    pub ip: Option<String>,

    pub ab_variant: Variant,
    pub variant_source: String,
    pub variant_timestamp: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub disqualification_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disqualification_step: Option<u8>,
}

impl LeadPayload {
    /// Payload for a final submission.
    pub fn complete(
        answers: &AnswerSet,
        contact: &Contact,
        ctx: &PayloadContext,
        config: &FunnelConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let disqualified = rules::is_disqualified(answers);
        Self::build(answers, contact, ctx, config, now, &config.source, disqualified)
    }

    /// Partial payload sent the moment a disqualifying answer is chosen.
    pub fn disqualified(
        answers: &AnswerSet,
        reason: &SingleAnswer,
        step: Step,
        ctx: &PayloadContext,
        config: &FunnelConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let mut contact = Contact::from_answers(answers);
        if contact.email.is_empty() {
            contact.email = UNKNOWN_EMAIL.to_string();
        }
        let mut payload = Self::build(
            answers,
            &contact,
            ctx,
            config,
            now,
            &config.disqualified_source,
            true,
        );
        if payload.name.is_empty() {
            payload.name = UNKNOWN_NAME.to_string();
        }
        payload.disqualification_reason = Some(reason.label().to_string());
        payload.disqualification_step = Some(step.index());
        payload
    }

    fn build(
        answers: &AnswerSet,
        contact: &Contact,
        ctx: &PayloadContext,
        config: &FunnelConfig,
        now: DateTime<Utc>,
        source: &str,
        disqualified: bool,
    ) -> Self {
        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let single = |q: Question| {
            answers
                .single(q)
                .map(|a| a.label().to_string())
                .unwrap_or_default()
        };
        let multi = |q: Question| {
            answers
                .multi_labels(q)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        let variant = ctx.landing.variant;

        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            name: contact.full_name(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            event_id: format!("grav-questionnaire-{}-{}", contact.email, now.timestamp_millis()),

            business_journey: single(Question::BusinessJourney),
            interest_reasons: multi(Question::InterestReasons),
            available_capital: single(Question::AvailableCapital),
            main_goal: single(Question::MainGoal),
            time_commitment: single(Question::TimeCommitment),
            ready_to_move_forward: single(Question::ReadyToMoveForward),
            support_needed: multi(Question::SupportNeeded),
            other_support_needed: answers.other_support_needed.clone(),
            strategy_call_commitment: single(Question::StrategyCallCommitment),

            source: source.to_string(),
            timestamp: stamp.clone(),
            submitted_at: stamp.clone(),
            submitted_from: ctx.submitted_from.clone(),
            qualified: !disqualified,
            disqualified,

            visited_path: ctx.landing.path.clone(),
            landing_page_variant: variant,
            ab_test_variant: variant.code(),
            ab_test_path: ctx.landing.path.clone(),
            is_variant_a: variant == Variant::VariantA,
            is_variant_1: variant == Variant::Variant1,
            is_root_redirect: variant == Variant::RootRedirect,

            utm: ctx.utm.clone(),

            fbc: non_empty(&answers.fbc),
            fbp: non_empty(&answers.fbp),
            user_agent: non_empty(&answers.user_agent),
            ip: non_empty(&answers.ip),

            ab_variant: variant,
            variant_source: config.variant_source.clone(),
            variant_timestamp: stamp,

            disqualification_reason: None,
            disqualification_step: None,
        }
    }
}
