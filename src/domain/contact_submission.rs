use serde::Deserialize;
use serde::Serialize;

use super::ContactEmail;
use super::ContactMessage;
use super::ContactName;
use super::ContactSubject;

/// Raw form data, as sent by the browser. Nothing here is trusted; a field
/// missing from the payload is treated as empty, so that it is reported as a
/// validation error rather than a malformed request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// A submission that passed validation. Only obtainable via `TryFrom<ContactForm>`.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: ContactEmail,
    pub subject: ContactSubject,
    pub message: ContactMessage,
}

impl TryFrom<ContactForm> for ContactSubmission {
    /// One human-readable reason per invalid field, in field order
    type Error = Vec<String>;

    fn try_from(value: ContactForm) -> Result<Self, Self::Error> {
        let name = ContactName::parse(value.name);
        let email = ContactEmail::parse(value.email);
        let subject = ContactSubject::parse(value.subject);
        let message = ContactMessage::parse(value.message);

        match (name, email, subject, message) {
            (Ok(name), Ok(email), Ok(subject), Ok(message)) => Ok(Self {
                name,
                email,
                subject,
                message,
            }),
            (name, email, subject, message) => Err([
                name.err(),
                email.err(),
                subject.err(),
                message.err(),
            ]
            .into_iter()
            .flatten()
            .collect()),
        }
    }
}

/// The single acceptance rule for contact forms, used both before a client
/// submits and when the relay receives a request.
pub fn validate(form: &ContactForm) -> Result<(), Vec<String>> {
    ContactSubmission::try_from(form.clone()).map(|_| ())
}
