//! Optional contact auto-fill from an external source (e.g. a CRM lookup
//! keyed by a tracking cookie).

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::questionnaire::AnswerSet;
use crate::store::{InitialContact, SnapshotStore};
use crate::submission::Contact;

/// Supplies known contact details for the current visitor.
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn lookup(&self) -> anyhow::Result<Option<Contact>>;
}

/// Fill still-empty contact fields from `source`. Never overwrites what the
/// visitor (or an earlier prefill) already provided.
///
/// A usable result is also persisted as the initial contact, so later
/// visits and submission fallbacks see it. Returns what was persisted.
pub async fn autofill(
    answers: &mut AnswerSet,
    source: &dyn ContactSource,
    snapshots: &SnapshotStore,
) -> Option<InitialContact> {
    let found = match source.lookup().await {
        Ok(Some(found)) => found,
        Ok(None) => return None,
        Err(e) => {
            warn!("Error auto-filling user data: {}", e);
            return None;
        }
    };

    // A result without a name or an email is not worth merging.
    if found.first_name.trim().is_empty() && found.email.trim().is_empty() {
        return None;
    }

    let mut contact = Contact::from_answers(answers);
    contact.fill_from(&found);
    answers.first_name = contact.first_name;
    answers.last_name = contact.last_name;
    answers.email = contact.email;
    answers.phone = contact.phone;

    let initial = InitialContact {
        full_name: found.full_name(),
        email: found.email.trim().to_string(),
        phone: found.phone.trim().to_string(),
    };
    snapshots.save_initial_contact(&initial);
    debug!("Auto-filled contact fields");
    Some(initial)
}
