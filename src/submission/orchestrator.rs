//! Final submission: validate, deliver, clear, redirect.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::config::FunnelConfig;
use crate::error::SubmitError;
use crate::questionnaire::{AnswerSet, SingleAnswer, Step};
use crate::store::{InitialContact, SnapshotStore};

use super::contact::{Contact, resolve_contact};
use super::payload::{LeadPayload, PayloadContext};
use super::redirect::RedirectTarget;
use super::sink::{DeliveryReport, DeliveryStatus, HttpSink, Sink};

/// Everything the submitter needs besides the answers.
#[derive(Debug, Clone, Default)]
pub struct SubmissionContext {
    pub payload: PayloadContext,
    /// Contact captured on an earlier funnel page.
    pub initial_contact: Option<InitialContact>,
    /// Same-session fallback, e.g. the landing URL prefill.
    pub fallback_contact: Contact,
}

/// What a submission produced.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub redirect: RedirectTarget,
    pub contact: Contact,
    pub report: DeliveryReport,
    /// The delivery path panicked and the redirect was re-derived.
    pub recovered: bool,
}

/// Delivers leads to the API then the webhook, and decides the redirect.
#[derive(Clone)]
pub struct Submitter {
    config: Arc<FunnelConfig>,
    snapshots: SnapshotStore,
    api: Arc<dyn Sink>,
    webhook: Arc<dyn Sink>,
}

impl Submitter {
    pub fn new(
        config: Arc<FunnelConfig>,
        snapshots: SnapshotStore,
        api: Arc<dyn Sink>,
        webhook: Arc<dyn Sink>,
    ) -> Self {
        Self {
            config,
            snapshots,
            api,
            webhook,
        }
    }

    /// Submitter posting to the configured HTTP endpoints.
    pub fn from_config(config: Arc<FunnelConfig>, snapshots: SnapshotStore) -> Self {
        let api = Arc::new(HttpSink::api(config.api_url.clone()));
        let webhook = Arc::new(HttpSink::webhook(config.webhook_url.clone()));
        Self::new(config, snapshots, api, webhook)
    }

    /// Submit a finished answer set.
    ///
    /// Only blocking validation failures are returned as errors. Sink
    /// failures are recorded in the report, and a panic anywhere in the
    /// submission still yields a redirect.
    pub async fn submit(
        &self,
        answers: &AnswerSet,
        ctx: &SubmissionContext,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let attempt = AssertUnwindSafe(self.try_submit(answers, ctx))
            .catch_unwind()
            .await;

        match attempt {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Critical error during form submission: {}", message);
                self.snapshots.clear_answers();
                let contact = known_contact(answers, ctx);
                Ok(SubmissionOutcome {
                    redirect: RedirectTarget::for_answers(answers, &contact),
                    contact,
                    report: DeliveryReport::default(),
                    recovered: true,
                })
            }
        }
    }

    async fn try_submit(
        &self,
        answers: &AnswerSet,
        ctx: &SubmissionContext,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let contact = resolve_contact(
            answers,
            ctx.initial_contact.as_ref(),
            &ctx.fallback_contact,
            &self.config.placeholder_email,
        )?;

        if !answers.has_questionnaire_answers() {
            return Err(SubmitError::NoAnswers);
        }

        info!(email = %contact.email, variant = %ctx.payload.landing.variant, "Submitting lead");
        Ok(self.deliver_and_route(answers, ctx, &contact).await)
    }

    async fn deliver_and_route(
        &self,
        answers: &AnswerSet,
        ctx: &SubmissionContext,
        contact: &Contact,
    ) -> SubmissionOutcome {
        let payload = LeadPayload::complete(answers, contact, &ctx.payload, &self.config, Utc::now());

        let mut report = DeliveryReport::default();
        for sink in [&self.api, &self.webhook] {
            let status = sink.deliver(&payload, self.config.sink_timeout).await;
            report.record(sink.name(), status);
        }
        info!(outcome = ?report.outcome(), "Lead delivery finished");

        self.snapshots.clear_answers();

        let redirect = RedirectTarget::for_answers(answers, contact);
        info!(disqualified = payload.disqualified, "Redirect decided");

        SubmissionOutcome {
            redirect,
            contact: contact.clone(),
            report,
            recovered: false,
        }
    }

    /// Post the partial lead for a disqualifying answer to the webhook only.
    pub async fn send_disqualified(
        &self,
        answers: &AnswerSet,
        reason: &SingleAnswer,
        step: Step,
        ctx: &PayloadContext,
    ) -> DeliveryStatus {
        let payload = LeadPayload::disqualified(answers, reason, step, ctx, &self.config, Utc::now());
        let status = self.webhook.deliver(&payload, self.config.sink_timeout).await;
        if let DeliveryStatus::Failed { ref reason } = status {
            warn!(step = step.index(), "Disqualified lead not recorded: {}", reason);
        }
        status
    }
}

/// Whatever contact details are on hand, without validation.
fn known_contact(answers: &AnswerSet, ctx: &SubmissionContext) -> Contact {
    let mut contact = Contact::from_answers(answers);
    if let Some(ref initial) = ctx.initial_contact {
        contact.fill_from(&Contact::from_initial(initial));
    }
    contact.fill_from(&ctx.fallback_contact);
    contact
}
