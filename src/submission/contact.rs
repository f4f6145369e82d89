//! Contact resolution: merge every place the funnel may have seen the
//! lead's name, email and phone.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attribution::LandingContext;
use crate::error::SubmitError;
use crate::format::is_valid_email;
use crate::questionnaire::AnswerSet;
use crate::store::InitialContact;

/// The contact quadruple carried on payloads and the scheduling redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn from_answers(answers: &AnswerSet) -> Self {
        Self {
            first_name: answers.first_name.trim().to_string(),
            last_name: answers.last_name.trim().to_string(),
            email: answers.email.trim().to_string(),
            phone: answers.phone.trim().to_string(),
        }
    }

    pub fn from_initial(initial: &InitialContact) -> Self {
        let (first_name, last_name) = initial.split_name();
        Self {
            first_name,
            last_name,
            email: initial.email.trim().to_string(),
            phone: initial.phone.trim().to_string(),
        }
    }

    /// Prefill values from the landing URL. `fullName` fills whichever
    /// name parts are not given explicitly.
    pub fn from_query(ctx: &LandingContext) -> Self {
        let param = |name: &str| ctx.query_param(name).unwrap_or_default().trim().to_string();
        let mut contact = Self {
            first_name: param("firstName"),
            last_name: param("lastName"),
            email: param("email"),
            phone: param("phone"),
        };
        if let Some(full) = ctx.query_param("fullName") {
            let (first, last) = split_full_name(full);
            if contact.first_name.is_empty() {
                contact.first_name = first;
            }
            if contact.last_name.is_empty() {
                contact.last_name = last;
            }
        }
        contact
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty()
            && self.last_name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
    }

    /// Fill empty fields from a lower-priority source.
    pub fn fill_from(&mut self, other: &Contact) {
        for (slot, value) in [
            (&mut self.first_name, &other.first_name),
            (&mut self.last_name, &other.last_name),
            (&mut self.email, &other.email),
            (&mut self.phone, &other.phone),
        ] {
            if slot.trim().is_empty() && !value.trim().is_empty() {
                *slot = value.trim().to_string();
            }
        }
    }
}

/// Split a full name on the first space into (first, rest).
pub fn split_full_name(full_name: &str) -> (String, String) {
    let name = full_name.trim();
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

/// Resolve the contact for submission: in-memory answers, then the
/// persisted initial contact, then the same-session fallback.
///
/// A missing email becomes `placeholder_email`; an email that is present
/// but malformed blocks submission.
pub fn resolve_contact(
    answers: &AnswerSet,
    initial: Option<&InitialContact>,
    fallback: &Contact,
    placeholder_email: &str,
) -> Result<Contact, SubmitError> {
    let mut contact = Contact::from_answers(answers);
    if let Some(initial) = initial {
        contact.fill_from(&Contact::from_initial(initial));
    }
    contact.fill_from(fallback);

    if contact.email.is_empty() {
        debug!("No email known at submit time, using placeholder");
        contact.email = placeholder_email.to_string();
    } else if !is_valid_email(&contact.email) {
        return Err(SubmitError::InvalidEmail);
    }

    Ok(contact)
}
