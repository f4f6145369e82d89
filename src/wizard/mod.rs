//! The questionnaire wizard: state machine, controller, autosave and
//! interaction events.

pub mod autosave;
pub mod controller;
pub mod events;
pub mod state;

pub use autosave::Autosave;
pub use controller::{Collaborators, WizardController};
pub use events::{FunnelEvent, FunnelEvents, RecordingEvents, TracingEvents};
pub use state::{Effect, Transition, WizardEvent, WizardState, step_for_field, transition};
