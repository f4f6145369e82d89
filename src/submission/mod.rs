//! Lead submission: contact resolution, payload, sinks and redirect.

pub mod contact;
pub mod orchestrator;
pub mod payload;
pub mod redirect;
pub mod sink;

pub use contact::{Contact, resolve_contact, split_full_name};
pub use orchestrator::{SubmissionContext, SubmissionOutcome, Submitter};
pub use payload::{LeadPayload, PayloadContext};
pub use redirect::RedirectTarget;
pub use sink::{Acceptance, DeliveryOutcome, DeliveryReport, DeliveryStatus, HttpSink, Sink};
