//! Where the visitor goes when the wizard is done.

use crate::config::FunnelConfig;
use crate::questionnaire::AnswerSet;
use crate::rules;

use super::contact::Contact;

/// Terminal navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Disqualified leads; no parameters.
    Disqualified,
    /// Scheduling page, carrying the contact as query parameters.
    BookCall { contact: Contact },
    /// Back to the funnel entry ("start over").
    Entry,
}

impl RedirectTarget {
    /// Route decision for a finished answer set.
    pub fn for_answers(answers: &AnswerSet, contact: &Contact) -> Self {
        if rules::is_disqualified(answers) {
            Self::Disqualified
        } else {
            Self::BookCall {
                contact: contact.clone(),
            }
        }
    }

    /// Site-relative URL, query values URL-encoded.
    pub fn url(&self, config: &FunnelConfig) -> String {
        match self {
            Self::Disqualified => config.disqualified_route.clone(),
            Self::Entry => config.entry_route.clone(),
            Self::BookCall { contact } => with_query(
                &config.book_call_route,
                &[
                    ("firstName", contact.first_name.as_str()),
                    ("lastName", contact.last_name.as_str()),
                    ("email", contact.email.as_str()),
                    ("phone", contact.phone.as_str()),
                ],
            ),
        }
    }
}

/// `route?k=v&...` with each key and value component-encoded.
fn with_query(route: &str, params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    if query.is_empty() {
        return route.to_string();
    }
    format!("{route}?{}", query.join("&"))
}

/// Percent-encode everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::{AvailableCapital, Readiness, SingleAnswer, StrategyCallCommitment};
    use reqwest::Url;

    fn qualified_jane() -> AnswerSet {
        let mut answers = AnswerSet {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@x.com".into(),
            phone: "5551234567".into(),
            ..Default::default()
        };
        answers.set_single(SingleAnswer::AvailableCapital(AvailableCapital::From30kTo50k));
        answers.set_single(SingleAnswer::ReadyToMoveForward(Readiness::Within30Days));
        answers.set_single(SingleAnswer::StrategyCallCommitment(StrategyCallCommitment::Yes));
        answers
    }

    #[test]
    fn qualified_lead_books_a_call() {
        let answers = qualified_jane();
        let target = RedirectTarget::for_answers(&answers, &Contact::from_answers(&answers));
        assert_eq!(
            target.url(&FunnelConfig::default()),
            "/book-call?firstName=Jane&lastName=Doe&email=jane%40x.com&phone=5551234567"
        );
    }

    #[test]
    fn disqualified_lead_has_no_parameters() {
        let mut answers = qualified_jane();
        answers.set_single(SingleAnswer::ReadyToMoveForward(Readiness::JustExploring));
        let target = RedirectTarget::for_answers(&answers, &Contact::from_answers(&answers));
        assert_eq!(target, RedirectTarget::Disqualified);
        assert_eq!(target.url(&FunnelConfig::default()), "/weappreciateyou");
    }

    #[test]
    fn contact_values_are_encoded() {
        let target = RedirectTarget::BookCall {
            contact: Contact {
                first_name: "Mary Ann".into(),
                last_name: "O'Neil&Co".into(),
                email: "m+1@x.com".into(),
                phone: "(555) 123-4567".into(),
            },
        };
        let url = target.url(&FunnelConfig::default());
        let parsed = Url::parse(&format!("http://localhost{url}")).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("firstName".into(), "Mary Ann".into()),
                ("lastName".into(), "O'Neil&Co".into()),
                ("email".into(), "m+1@x.com".into()),
                ("phone".into(), "(555) 123-4567".into()),
            ]
        );
        assert!(!url.contains(' '));
        assert_eq!(
            url,
            "/book-call?firstName=Mary%20Ann&lastName=O'Neil%26Co&email=m%2B1%40x.com&phone=(555)%20123-4567"
        );
        assert_eq!(RedirectTarget::Entry.url(&FunnelConfig::default()), "/");
    }
}
