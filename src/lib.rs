//! Apply Funnel: multi-step lead-capture questionnaire with attribution,
//! resumable progress and dual-sink lead delivery.

pub mod attribution;
pub mod autofill;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod questionnaire;
pub mod rules;
pub mod store;
pub mod submission;
pub mod wizard;
