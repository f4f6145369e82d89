//! WizardController: owns the answer set and the wizard position, runs
//! transitions and carries out their effects.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::attribution::{
    IpLookup, LandingAttribution, LandingContext, UtmParams, VariantResolver, apply_tracking,
    lookup_ip,
};
use crate::autofill::{ContactSource, autofill};
use crate::config::FunnelConfig;
use crate::error::SubmitError;
use crate::questionnaire::{AnswerSet, MultiAnswer, SingleAnswer, Step, TextField, resume_step};
use crate::store::{InitialContact, KeyValueStore, Restored, SnapshotStore};
use crate::submission::{
    Contact, PayloadContext, RedirectTarget, SubmissionContext, Submitter,
};

use super::autosave::Autosave;
use super::events::{FunnelEvents, TracingEvents};
use super::state::{Effect, WizardEvent, WizardState, transition};

/// Everything the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub config: Arc<FunnelConfig>,
    /// Local (persistent) storage.
    pub snapshots: SnapshotStore,
    /// Session-scoped storage, consulted for the landing variant.
    pub session: Option<Arc<dyn KeyValueStore>>,
    pub submitter: Submitter,
    pub events: Arc<dyn FunnelEvents>,
    pub contact_source: Option<Arc<dyn ContactSource>>,
    pub ip_lookup: Option<Arc<dyn IpLookup>>,
}

impl Collaborators {
    /// Collaborators with tracing events and no optional sources.
    pub fn new(config: Arc<FunnelConfig>, snapshots: SnapshotStore, submitter: Submitter) -> Self {
        Self {
            config,
            snapshots,
            session: None,
            submitter,
            events: Arc::new(TracingEvents),
            contact_source: None,
            ip_lookup: None,
        }
    }

    pub fn with_session(mut self, session: Arc<dyn KeyValueStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn FunnelEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn with_contact_source(mut self, source: Arc<dyn ContactSource>) -> Self {
        self.contact_source = Some(source);
        self
    }

    pub fn with_ip_lookup(mut self, lookup: Arc<dyn IpLookup>) -> Self {
        self.ip_lookup = Some(lookup);
        self
    }
}

/// The questionnaire wizard. Sole writer of the answer set and its snapshot.
pub struct WizardController {
    deps: Collaborators,
    state: WizardState,
    answers: AnswerSet,
    autosave: Autosave,
    payload_ctx: PayloadContext,
    initial_contact: Option<InitialContact>,
    fallback_contact: Contact,
    recovery_banner: bool,
    is_submitting: bool,
    last_error: Option<SubmitError>,
}

impl WizardController {
    /// Hydrate the wizard for a page load.
    pub async fn mount(deps: Collaborators, ctx: &LandingContext) -> Self {
        let landing = VariantResolver::new(deps.snapshots.clone(), deps.session.clone()).resolve(ctx);
        let autosave = Autosave::new(deps.snapshots.clone(), deps.config.autosave_debounce);

        let payload_ctx = PayloadContext {
            landing: landing.clone(),
            utm: UtmParams::from_context(ctx),
            submitted_from: ctx
                .page_url
                .clone()
                .unwrap_or_else(|| deps.config.site_url.clone()),
        };

        let mut controller = Self {
            deps,
            state: WizardState::default(),
            answers: AnswerSet::default(),
            autosave,
            payload_ctx,
            initial_contact: None,
            fallback_contact: Contact::from_query(ctx),
            recovery_banner: false,
            is_submitting: false,
            last_error: None,
        };

        let stored = controller.deps.snapshots.load_answers();
        let initial = controller.deps.snapshots.load_initial_contact();

        if matches!(stored, Restored::Unavailable) || matches!(initial, Restored::Unavailable) {
            warn!("Local storage unavailable at mount, resetting the form");
            controller.hard_reset();
            controller.recovery_banner = true;
        } else {
            controller.hydrate(stored.loaded(), initial.loaded(), ctx, &landing).await;
        }

        controller.answers.ab_variant = Some(landing.variant);
        apply_tracking(&mut controller.answers, ctx, Utc::now());
        if let Some(lookup) = controller.deps.ip_lookup.clone() {
            let limit = controller.deps.config.ip_lookup_timeout;
            if let Some(ip) = lookup_ip(lookup.as_ref(), limit).await {
                controller.answers.ip = ip;
            }
        }

        controller.deps.events.form_started();
        controller.autosave.schedule(&controller.answers);
        info!(
            step = %controller.state,
            variant = %landing.variant,
            "Questionnaire mounted"
        );
        controller
    }

    async fn hydrate(
        &mut self,
        stored: Option<AnswerSet>,
        mut initial: Option<InitialContact>,
        ctx: &LandingContext,
        landing: &LandingAttribution,
    ) {
        let resumed = stored.is_some();
        let mut answers = stored.unwrap_or_default();
        let step = if resumed {
            resume_step(&answers)
        } else {
            Step::FIRST
        };

        let mut contact = Contact::from_query(ctx);
        contact.fill_from(&Contact::from_answers(&answers));
        if let Some(ref initial) = initial {
            contact.fill_from(&Contact::from_initial(initial));
        }
        answers.first_name = contact.first_name;
        answers.last_name = contact.last_name;
        answers.email = contact.email;
        answers.phone = contact.phone;

        if let Some(source) = self.deps.contact_source.clone() {
            let found = autofill(&mut answers, source.as_ref(), &self.deps.snapshots).await;
            if let Some(found) = found {
                initial.get_or_insert(found);
            }
        }

        debug!(
            resumed,
            step = step.index(),
            variant = %landing.variant,
            "Hydrated answer set"
        );
        self.answers = answers;
        self.initial_contact = initial;
        self.state = WizardState::Step(step);
    }

    fn hard_reset(&mut self) {
        self.autosave.cancel();
        self.deps.snapshots.clear_answers();
        self.deps.snapshots.clear_initial_contact();
        self.answers = AnswerSet::default();
        self.initial_contact = None;
        self.state = WizardState::Step(Step::FIRST);
        self.is_submitting = false;
        self.last_error = None;
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> Option<Step> {
        self.state.step()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn landing(&self) -> &LandingAttribution {
        &self.payload_ctx.landing
    }

    pub fn config(&self) -> &FunnelConfig {
        &self.deps.config
    }

    /// Whether the "something went wrong" recovery banner is showing.
    pub fn recovery_banner(&self) -> bool {
        self.recovery_banner
    }

    /// Busy flag for the submit affordance.
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// The last blocking validation error from a submit attempt.
    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    /// Where the page navigated, once terminal.
    pub fn redirect(&self) -> Option<&RedirectTarget> {
        match &self.state {
            WizardState::Redirected(target) => Some(target),
            _ => None,
        }
    }

    pub fn redirect_url(&self) -> Option<String> {
        self.redirect().map(|target| target.url(&self.deps.config))
    }

    // ── Events ─────────────────────────────────────────────────────

    pub async fn advance(&mut self) {
        self.dispatch(WizardEvent::Advance).await;
    }

    pub async fn retreat(&mut self) {
        self.dispatch(WizardEvent::Retreat).await;
    }

    /// Choose a single-select option. Waits out the auto-advance or the
    /// disqualified dispatch before returning.
    pub async fn select_single(&mut self, answer: SingleAnswer) {
        self.dispatch(WizardEvent::SelectSingle(answer)).await;
    }

    pub async fn toggle_multi(&mut self, answer: MultiAnswer) {
        self.dispatch(WizardEvent::ToggleMulti(answer)).await;
    }

    pub async fn set_text(&mut self, field: TextField, value: impl Into<String>) {
        self.dispatch(WizardEvent::SetText(field, value.into())).await;
    }

    /// Submit from the last step. Returns the redirect, or the blocking
    /// validation error that kept the wizard on the last step.
    pub async fn submit(&mut self) -> Result<RedirectTarget, SubmitError> {
        if self.is_submitting {
            return Err(SubmitError::Incomplete);
        }
        self.last_error = None;
        self.dispatch(WizardEvent::Submit).await;
        if let Some(target) = self.redirect() {
            return Ok(target.clone());
        }
        Err(self.last_error.clone().unwrap_or(SubmitError::Incomplete))
    }

    /// Run an event and everything it triggers, in order.
    pub async fn dispatch(&mut self, event: WizardEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let from = self.state.clone();
            let t = transition(&from, &event, &self.answers);
            if t.is_noop(&from) {
                debug!(state = %from, ?event, "Event ignored");
                continue;
            }
            if t.next != from {
                debug!(from = %from, to = %t.next, "Wizard transition");
            }
            self.state = t.next;
            for effect in t.effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<WizardEvent> {
        match effect {
            Effect::SetSingle(answer) => {
                self.answers.set_single(answer);
                self.autosave.schedule(&self.answers);
                None
            }
            Effect::ToggleMulti(answer) => {
                self.answers.toggle_multi(answer);
                self.autosave.schedule(&self.answers);
                None
            }
            Effect::SetText(field, value) => {
                self.answers.set_text(field, value);
                self.autosave.schedule(&self.answers);
                None
            }
            Effect::ContinueClicked { step, answer } => {
                self.deps.events.continue_clicked(step, &answer);
                None
            }
            Effect::ResetQuestionTimer => {
                if let Some(step) = self.state.step() {
                    self.deps.events.question_timer_reset(step);
                }
                None
            }
            Effect::ScheduleAutoAdvance => {
                tokio::time::sleep(self.deps.config.auto_advance_delay).await;
                Some(WizardEvent::AutoAdvance)
            }
            Effect::NotifyDisqualified { reason, step } => {
                info!(
                    step = step.index(),
                    answer = reason.label(),
                    "Disqualifying answer selected"
                );
                self.autosave.flush(&self.answers);
                tokio::time::sleep(self.deps.config.disqualify_delay).await;
                self.deps
                    .submitter
                    .send_disqualified(&self.answers, &reason, step, &self.payload_ctx)
                    .await;
                Some(WizardEvent::Finish(RedirectTarget::Disqualified))
            }
            Effect::BeginSubmission => Some(self.run_submission().await),
        }
    }

    async fn run_submission(&mut self) -> WizardEvent {
        self.is_submitting = true;
        self.autosave.cancel();
        self.deps.events.form_submitted(&self.answers);

        let ctx = SubmissionContext {
            payload: self.payload_ctx.clone(),
            initial_contact: self.initial_contact.clone(),
            fallback_contact: self.fallback_contact.clone(),
        };

        match self.deps.submitter.submit(&self.answers, &ctx).await {
            Ok(outcome) => {
                if outcome.recovered {
                    warn!("Submission recovered from a critical error");
                }
                self.deps.events.application_completed(&outcome.contact);
                WizardEvent::Finish(outcome.redirect)
            }
            Err(e) => {
                warn!("Form submission error: {}", e);
                self.last_error = Some(e);
                self.is_submitting = false;
                WizardEvent::SubmitRejected
            }
        }
    }

    // ── Recovery ───────────────────────────────────────────────────

    /// "Reset and continue": wipe persisted state and start from step 1.
    pub fn reset_and_continue(&mut self) {
        self.hard_reset();
        self.recovery_banner = false;
        info!("Form reset successfully");
    }

    /// "Start over": leave for the funnel entry.
    pub fn start_over(&mut self) -> RedirectTarget {
        self.autosave.cancel();
        self.recovery_banner = false;
        self.state = WizardState::Redirected(RedirectTarget::Entry);
        RedirectTarget::Entry
    }
}
