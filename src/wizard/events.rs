//! Funnel interaction events (analytics / pixel side channel).
//!
//! Fire-and-forget: implementations must not block and must not fail the
//! wizard.

use std::sync::Mutex;

use tracing::info;

use crate::questionnaire::{AnswerSet, Step};
use crate::submission::Contact;

/// Receiver for funnel interaction events.
pub trait FunnelEvents: Send + Sync {
    fn form_started(&self) {}
    fn continue_clicked(&self, _step: Step, _answer: &str) {}
    fn question_timer_reset(&self, _step: Step) {}
    fn form_submitted(&self, _answers: &AnswerSet) {}
    fn application_completed(&self, _contact: &Contact) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl FunnelEvents for TracingEvents {
    fn form_started(&self) {
        info!("Form tracking started");
    }

    fn continue_clicked(&self, step: Step, answer: &str) {
        info!(step = step.index(), answer, "Continue clicked");
    }

    fn question_timer_reset(&self, step: Step) {
        tracing::debug!(step = step.index(), "Question timer reset");
    }

    fn form_submitted(&self, answers: &AnswerSet) {
        info!(
            singles = answers.single_answers().len(),
            interest_reasons = answers.interest_reasons.len(),
            support_needed = answers.support_needed.len(),
            "Form submitted"
        );
    }

    fn application_completed(&self, contact: &Contact) {
        info!(email = %contact.email, name = %contact.full_name(), "Application completed");
    }
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunnelEvent {
    FormStarted,
    ContinueClicked { step: Step, answer: String },
    QuestionTimerReset(Step),
    FormSubmitted,
    ApplicationCompleted(Contact),
}

/// Keeps events in memory for assertions.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<FunnelEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FunnelEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: FunnelEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl FunnelEvents for RecordingEvents {
    fn form_started(&self) {
        self.push(FunnelEvent::FormStarted);
    }

    fn continue_clicked(&self, step: Step, answer: &str) {
        self.push(FunnelEvent::ContinueClicked {
            step,
            answer: answer.to_string(),
        });
    }

    fn question_timer_reset(&self, step: Step) {
        self.push(FunnelEvent::QuestionTimerReset(step));
    }

    fn form_submitted(&self, _answers: &AnswerSet) {
        self.push(FunnelEvent::FormSubmitted);
    }

    fn application_completed(&self, contact: &Contact) {
        self.push(FunnelEvent::ApplicationCompleted(contact.clone()));
    }
}
